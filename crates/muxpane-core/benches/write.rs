use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use muxpane_core::{Grid, Screen, ScreenWriter, Style};

fn ascii_corpus() -> String {
    let line = "The quick brown fox jumps over the lazy dog. 0123456789 ABCDEF";
    line.repeat(64)
}

fn cjk_corpus() -> String {
    let line = "你好世界 café résumé 日本語テスト line of text ";
    line.repeat(64)
}

fn markup_corpus() -> String {
    let line = "#[fg=green,bold]ok#[default] plain #[bg=colour240]highlight#[default] tail ";
    line.repeat(64)
}

fn put_text_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_text");
    let corpora = [
        ("ascii", ascii_corpus()),
        ("cjk", cjk_corpus()),
    ];

    for (id, text) in &corpora {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(id), text, |b, text| {
            let style = Style::default();
            b.iter(|| {
                let mut screen = Screen::new(120, 40);
                let mut grid = Grid::with_history(120, 40, 512);
                let mut writer = ScreenWriter::new(&mut screen, &mut grid);
                let mut instructions = 0usize;
                instructions += writer.put_text(&style, true, None, black_box(text)).len();
                black_box(instructions);
            });
        });
    }
    group.finish();
}

fn put_markup_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_markup");
    let text = markup_corpus();
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("styled_stream", |b| {
        let style = Style::default();
        b.iter(|| {
            let mut screen = Screen::new(120, 40);
            let mut grid = Grid::with_history(120, 40, 512);
            let mut writer = ScreenWriter::new(&mut screen, &mut grid);
            let out = writer.put_markup(&style, true, None, black_box(&text));
            black_box(out.len());
        });
    });
    group.finish();
}

fn scroll_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("line_feed_with_history", |b| {
        let style = Style::default();
        b.iter(|| {
            let mut screen = Screen::new(80, 24);
            let mut grid = Grid::with_history(80, 24, 2_000);
            let mut writer = ScreenWriter::new(&mut screen, &mut grid);
            for i in 0..1_000u32 {
                writer.put_char(&style, b'a' + (i % 26) as u8);
                writer.carriage_return();
                writer.line_feed(false);
            }
            black_box(writer.screen().cy());
        });
    });
    group.finish();
}

criterion_group!(benches, put_text_bench, put_markup_bench, scroll_bench);
criterion_main!(benches);
