//! 跳转路径上的同步开销基准测试：机器人识别、欺诈评分汇总、会话签发

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use affilink::config::{FraudConfig, TrackingConfig};
use affilink::tracking::heuristics::assess;
use affilink::tracking::{BotClassifier, DeviceInfo, SessionManager, SignatureBotClassifier};
use affilink::utils::is_valid_short_code;

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

fn bench_bot_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking/bot_classifier");
    let classifier = SignatureBotClassifier::default();

    group.bench_function("browser", |b| {
        b.iter(|| classifier.classify(black_box(Some(CHROME_UA))))
    });
    group.bench_function("signature_hit", |b| {
        b.iter(|| classifier.classify(black_box(Some(GOOGLEBOT_UA))))
    });
    group.bench_function("missing", |b| b.iter(|| classifier.classify(black_box(None))));

    group.finish();
}

fn bench_fraud_assess(c: &mut Criterion) {
    let config = FraudConfig::default();

    c.bench_function("tracking/fraud_assess", |b| {
        b.iter(|| assess(&config, black_box(Some(2)), black_box(1), black_box(Some(CHROME_UA))))
    });
}

fn bench_session(c: &mut Criterion) {
    let manager = SessionManager::new(&TrackingConfig::default());
    let existing = manager.get_or_create_session(None).id;

    let mut group = c.benchmark_group("tracking/session");
    group.bench_function("mint", |b| b.iter(|| manager.get_or_create_session(None)));
    group.bench_function("reuse", |b| {
        b.iter(|| manager.get_or_create_session(black_box(Some(existing.as_str()))))
    });
    group.finish();
}

fn bench_request_parsing(c: &mut Criterion) {
    c.bench_function("utils/is_valid_short_code", |b| {
        b.iter(|| is_valid_short_code(black_box("spring_sale-2026")))
    });
    c.bench_function("tracking/device_info", |b| {
        b.iter(|| DeviceInfo::from_user_agent(black_box(Some(CHROME_UA))))
    });
}

criterion_group!(
    benches,
    bench_bot_classifier,
    bench_fraud_assess,
    bench_session,
    bench_request_parsing
);
criterion_main!(benches);
