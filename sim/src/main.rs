use log::{info, warn};
use umlink::{
    BurstReport, FramingInfo, RxConfig, SduSink, Segment, Telemetry, UmPdu, UmRxEntity,
};

const NUM_SDUS: u32 = 2000;
const MTU: usize = 256; // payload bytes per PDU
const WINDOW_SIZE: usize = 16;
const REORDERING_TIMEOUT_MS: u64 = 20;
const SHUFFLE_SPAN: usize = 6; // max reordering distance, in PDUs
const DROP_ONE_IN: u64 = 50;
const DUPLICATE_ONE_IN: u64 = 40;

/// Deterministic xorshift64 generator, seeded per run.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn chance(&mut self, one_in: u64) -> bool {
        self.next() % one_in == 0
    }
}

#[derive(Default)]
struct Collector {
    delivered: u64,
    bytes: u64,
    last_sno: Option<u32>,
    out_of_order: u64,
}

impl SduSink for Collector {
    fn on_sdu_ready(&mut self, sdu_sno: u32, payload: Vec<u8>) {
        if let Some(last) = self.last_sno {
            if sdu_sno <= last {
                self.out_of_order += 1;
                warn!("SDU {sdu_sno} delivered after {last}");
            }
        }
        self.last_sno = Some(sdu_sno);
        self.delivered += 1;
        self.bytes += payload.len() as u64;
    }
}

#[derive(Default)]
struct Meter {
    sdus_lost: u64,
    pdus_lost: u64,
    bursts: u64,
    burst_bytes: u64,
}

impl Telemetry for Meter {
    fn sdu_lost(&mut self, _sdu_sno: u32) {
        self.sdus_lost += 1;
    }
    fn pdu_lost(&mut self, _tsn: u32) {
        self.pdus_lost += 1;
    }
    fn burst_ended(&mut self, report: BurstReport) {
        self.bursts += 1;
        self.burst_bytes += report.bytes;
    }
}

/// Cuts each SDU into MTU-sized PDUs the way a transmitting entity
/// would, tagging every PDU with its framing bits.
fn fragment_stream(rng: &mut Rng) -> Vec<UmPdu> {
    let mut pdus = Vec::new();
    let mut tsn = 0u32;

    for sno in 0..NUM_SDUS {
        let len = 64 + (rng.next() as usize % (3 * MTU));
        let payload: Vec<u8> = (0..len).map(|i| (i as u32 ^ sno) as u8).collect();

        let chunks: Vec<&[u8]> = payload.chunks(MTU).collect();
        let n = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let fi = match (i == 0, i == n - 1) {
                (true, true) => FramingInfo::Complete,
                (true, false) => FramingInfo::FirstPiece,
                (false, false) => FramingInfo::MiddlePiece,
                (false, true) => FramingInfo::LastPiece,
            };
            pdus.push(UmPdu::with_segment(tsn, fi, Segment::new(sno, len, chunk.to_vec())));
            tsn += 1;
        }
    }

    pdus
}

/// Applies bounded reordering, random drops and random duplicates.
fn disturb(pdus: Vec<UmPdu>, rng: &mut Rng) -> (Vec<UmPdu>, u64) {
    let mut arrivals = pdus;
    for i in 0..arrivals.len() {
        let j = i + rng.next() as usize % SHUFFLE_SPAN;
        if j < arrivals.len() {
            arrivals.swap(i, j);
        }
    }

    let mut dropped = 0u64;
    let mut lossy = Vec::with_capacity(arrivals.len());
    for pdu in arrivals {
        if rng.chance(DROP_ONE_IN) {
            dropped += 1;
            continue;
        }
        if rng.chance(DUPLICATE_ONE_IN) {
            lossy.push(pdu.clone());
        }
        lossy.push(pdu);
    }
    (lossy, dropped)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = Rng(0x9E3779B97F4A7C15);
    let sent = fragment_stream(&mut rng);
    let num_sent = sent.len();
    let (mut arrivals, dropped) = disturb(sent, &mut rng);

    // A trailing marker SDU that is never dropped or reordered, so the
    // loss accounting below covers the whole stream.
    arrivals.push(UmPdu::with_segment(
        num_sent as u32,
        FramingInfo::Complete,
        Segment::new(NUM_SDUS, 1, vec![0xFF]),
    ));

    info!(
        "simulating {} SDUs over {} PDUs ({} dropped, {} arrivals)",
        NUM_SDUS,
        num_sent,
        dropped,
        arrivals.len()
    );

    let mut rx: UmRxEntity<WINDOW_SIZE> = UmRxEntity::new(
        RxConfig::new()
            .with_window_size(WINDOW_SIZE)
            .with_reordering_timeout_ms(REORDERING_TIMEOUT_MS),
    )
    .expect("invalid receiver configuration");

    let mut sink = Collector::default();
    let mut meter = Meter::default();

    // One arrival per millisecond, the timer polled on every tick.
    let mut now_ms = 0u64;
    for pdu in arrivals {
        rx.enqueue(pdu, now_ms, &mut sink, &mut meter)
            .expect("reassembly corrupted");
        rx.poll_timer(now_ms, &mut sink, &mut meter)
            .expect("reassembly corrupted");
        now_ms += 1;
    }

    // Let the reordering timer flush whatever is still pending.
    while let Some(deadline) = rx.next_deadline() {
        now_ms = now_ms.max(deadline);
        rx.poll_timer(now_ms, &mut sink, &mut meter)
            .expect("reassembly corrupted");
    }
    rx.reset_drain(&mut sink, &mut meter)
        .expect("reassembly corrupted");

    let stats = rx.stats();
    info!("=== Receive Complete ===");
    info!("SDUs delivered: {} ({} KB)", sink.delivered, sink.bytes / 1024);
    info!("SDUs lost: {}", meter.sdus_lost);
    info!(
        "PDUs: {} received, {} lost, {} duplicates, {} stale",
        stats.pdus_received, meter.pdus_lost, stats.duplicates, stats.stale
    );
    info!("timer expiries: {}", stats.timer_expiries);
    info!("bursts: {} ({} KB)", meter.bursts, meter.burst_bytes / 1024);

    if sink.out_of_order > 0 {
        warn!("{} SDUs delivered out of order", sink.out_of_order);
        std::process::exit(1);
    }
    // Stream SDUs plus the trailing marker.
    let expected = u64::from(NUM_SDUS) + 1;
    if sink.delivered + meter.sdus_lost != expected {
        warn!(
            "accounting mismatch: {} delivered + {} lost != {}",
            sink.delivered, meter.sdus_lost, expected
        );
        std::process::exit(1);
    }
    info!("every SDU accounted for, all deliveries in order");
}
