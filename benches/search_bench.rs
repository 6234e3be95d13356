use criterion::{criterion_group, criterion_main, Criterion};
use retrace::highlight::build_highlight_segments;
use retrace::models::{ContentKind, HistoryRecord};
use retrace::search::Searcher;
use retrace::SearchableField;

/// Deterministic mixed-script corpus sized like a large real history.
fn synthetic_history(count: usize) -> Vec<HistoryRecord> {
    let titles = [
        "TypeScript 入门指南",
        "Rust 所有权与借用详解",
        "How to structure a large frontend project",
        "浏览器渲染原理解析",
        "Understanding async runtimes in practice",
        "数据库索引为什么用 B+ 树",
        "A field guide to error handling",
        "如何高效阅读源代码",
    ];
    let contents = [
        "一篇关于 TypeScript 类型系统的长文，从基础讲到进阶。",
        "ownership, borrowing and lifetimes explained with examples",
        "从 HTML 解析到合成层，完整走一遍渲染流水线。",
        "practical patterns for propagating and reporting failures",
    ];
    (0..count)
        .map(|i| HistoryRecord {
            author_name: format!("author-{}", i % 17),
            item_id: i.to_string(),
            title: format!("{} ({})", titles[i % titles.len()], i),
            kind: ContentKind::Answer,
            url: None,
            visit_time: Some(1_700_000_000_000 + i as i64),
            content: Some(contents[i % contents.len()].to_string()),
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let searcher = Searcher::new();
    let queries = vec![
        ("ascii_word", "typescript"),
        ("cjk_word", "入门指南"),
        ("mixed_multi", "rust 所有权 borrowing"),
        ("long_query", "how to structure a large frontend project 从基础讲到进阶"),
    ];

    let mut group = c.benchmark_group("tokenize");
    for (name, query) in queries {
        group.bench_function(name, |b| b.iter(|| searcher.tokenize(query)));
    }
    group.finish();
}

fn bench_search_items(c: &mut Criterion) {
    let searcher = Searcher::new();
    let items = synthetic_history(200);

    let queries = vec![
        ("ascii_word", "typescript"),
        ("cjk_word", "入门"),
        ("mixed_multi", "rust 所有权"),
        ("no_hits", "zzzzzz"),
    ];

    let mut group = c.benchmark_group("search_items");
    group.sample_size(20);
    for (name, query) in queries {
        group.bench_function(name, |b| {
            b.iter(|| searcher.search_items(&items, query))
        });
    }
    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let searcher = Searcher::new();
    let items = synthetic_history(1);
    let map = searcher.search_items(&items, "typescript 入门");
    let spans = map
        .get(&0)
        .and_then(|r| r.field_spans(SearchableField::Title))
        .expect("corpus item 0 should match");

    c.bench_function("build_highlight_segments", |b| {
        b.iter(|| build_highlight_segments(&items[0].title, spans))
    });
}

criterion_group!(benches, bench_tokenize, bench_search_items, bench_highlight);
criterion_main!(benches);
