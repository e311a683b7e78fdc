// End-to-end tests of the scanning pipeline through the library API

use passage_scan::parallel_processing::run_passage_scan;
use passage_scan::{BigramWeights, PipelineConfig, ScanError, WeightTransform, WindowParams};
use std::path::Path;
use std::sync::Arc;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

async fn params_for(fixture: &TestFixture, configs: &[(WeightTransform, usize)]) -> Vec<Arc<WindowParams>> {
    let mut params = Vec::new();
    for &(transform, max_chars) in configs {
        let weights = BigramWeights::load(&fixture.weights_path, transform)
            .await
            .expect("weight table should load");
        params.push(Arc::new(WindowParams::new(Arc::new(weights), max_chars)));
    }
    params
}

fn config(top_n: usize) -> PipelineConfig {
    PipelineConfig {
        workers: 3,
        top_n,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_hello_world_end_to_end() {
    let fixture = TestFixture::new();
    fixture.create_text_file("greeting.txt", "hello world");

    let params = params_for(&fixture, &[(WeightTransform::Raw, 5)]).await;
    let report = run_passage_scan(&fixture.root_path, params, &config(10)).await;

    assert!(!report.has_errors());
    let passages = report.configs[0].passages();
    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0].text(), "hello");
    assert_eq!(passages[0].score(), 20.0);
    assert_eq!(passages[0].size(), 5);
    assert!(passages[0].file_path().ends_with("greeting.txt"));
}

#[tokio::test]
async fn test_ranks_files_and_truncates_to_top_n() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "hello there");
    fixture.create_text_file("nested/b.md", "a help me");
    fixture.create_text_file("nested/deeper/c.TXT", "shell low");
    fixture.create_text_file("d.txt", "he");
    fixture.create_text_file("skip.rtf", "hello hello hello");

    let params = params_for(&fixture, &[(WeightTransform::Raw, 12)]).await;
    let report = run_passage_scan(&fixture.root_path, params, &config(2)).await;

    assert!(!report.has_errors());
    assert_eq!(report.files_scanned, 4);

    let result = &report.configs[0];
    let scores: Vec<f64> = result.passages().iter().map(|p| p.score()).collect();
    // a.txt and c.TXT both reach 20; b.md reaches 15; d.txt 10
    assert_eq!(scores, vec![20.0, 20.0]);
    assert_eq!(result.stats.files_processed, 4);
    assert_eq!(result.stats.max_score, 20.0);
    assert_eq!(result.stats.min_score, 10.0);
    assert!((result.stats.mean - 16.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_each_configuration_is_independent() {
    let fixture = TestFixture::new();
    fixture.create_text_file("poem.txt", "oh hello yellow fellow hello");

    let params = params_for(
        &fixture,
        &[
            (WeightTransform::Raw, 5),
            (WeightTransform::Raw, 30),
            (WeightTransform::Normal, 5),
            (WeightTransform::Log1p, 5),
        ],
    )
    .await;
    let report = run_passage_scan(&fixture.root_path, params, &config(5)).await;

    assert_eq!(report.configs.len(), 4);
    assert_eq!(report.configs[0].passages()[0].text(), "hello");
    assert_eq!(report.configs[1].passages()[0].text(), "oh hello");
    assert!((report.configs[2].passages()[0].score() - 1.0).abs() < 1e-12);
    let expected_log: f64 = [10.0f64, 5.0, 3.0, 2.0].iter().map(|c| c.ln_1p()).sum();
    assert!((report.configs[3].passages()[0].score() - expected_log).abs() < 1e-9);

    // same max_chars, different transforms, kept apart
    assert_eq!(report.configs[0].params.id(), report.configs[2].params.id());
    assert_eq!(report.configs[0].transform(), WeightTransform::Raw);
    assert_eq!(report.configs[2].transform(), WeightTransform::Normal);
}

#[tokio::test]
async fn test_non_utf8_files_are_still_scored() {
    let fixture = TestFixture::new();
    fixture.create_raw_file("latin1.txt", b"caf\xe9 hello world");
    fixture.create_raw_file("mixed.txt", &[b'h', b'e', b'\n', 0xFF, 0xFE, 0xFD]);

    let params = params_for(&fixture, &[(WeightTransform::Raw, 5)]).await;
    let report = run_passage_scan(&fixture.root_path, params, &config(5)).await;

    assert!(!report.has_errors());
    assert_eq!(report.files_scanned, 2);

    let passages = report.configs[0].passages();
    assert_eq!(passages.len(), 2);
    assert_eq!(passages[0].text(), "hello");
    assert_eq!(passages[0].score(), 20.0);
    assert!(passages[0].file_path().ends_with("latin1.txt"));
    assert_eq!(passages[1].text(), "he");
    assert_eq!(report.summary().files_failed, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_is_an_open_error() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.create_text_file("ok.txt", "hello");
    let locked = fixture.create_text_file("locked.txt", "hello");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits; nothing to assert in that case
    if std::fs::read(&locked).is_ok() {
        return;
    }

    let params = params_for(&fixture, &[(WeightTransform::Raw, 5)]).await;
    let report = run_passage_scan(&fixture.root_path, params, &config(5)).await;
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();

    assert!(report.has_errors());
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], ScanError::Open { .. }));
    assert!(report.errors[0].path().unwrap().ends_with("locked.txt"));

    // partial results survive
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.configs[0].passages().len(), 1);
    assert_eq!(report.summary().files_failed, 1);
}

#[tokio::test]
async fn test_empty_and_unscored_files_do_not_touch_stats() {
    let fixture = TestFixture::new();
    fixture.create_text_file("empty.txt", "");
    fixture.create_text_file("blank.md", "   \n\t\n");
    fixture.create_text_file("nothing.txt", "xyz qqq");

    let params = params_for(&fixture, &[(WeightTransform::Raw, 20)]).await;
    let report = run_passage_scan(&fixture.root_path, params, &config(5)).await;

    assert!(!report.has_errors());
    assert_eq!(report.files_scanned, 3);
    assert!(report.configs[0].passages().is_empty());
    assert_eq!(report.configs[0].stats.files_processed, 0);
}

#[tokio::test]
async fn test_mmap_reader_matches_buffered_reader() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "Well, hello\nthere! I'll tell\r\nyou");
    fixture.create_text_file("b.txt", "yellow\n\nfellow he");

    let configs = [(WeightTransform::Raw, 11), (WeightTransform::Log1p, 20)];
    let buffered = run_passage_scan(&fixture.root_path, params_for(&fixture, &configs).await, &config(5)).await;

    let mut mmap_config = config(5);
    mmap_config.reader.use_mmap = true;
    let mapped = run_passage_scan(&fixture.root_path, params_for(&fixture, &configs).await, &mmap_config).await;

    for (a, b) in buffered.configs.iter().zip(&mapped.configs) {
        let describe = |p: &passage_scan::Passage| (p.file_path().to_path_buf(), p.text(), p.score().to_bits());
        let mut left: Vec<_> = a.passages().iter().map(describe).collect();
        let mut right: Vec<_> = b.passages().iter().map(describe).collect();
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }
}

#[tokio::test]
async fn test_missing_weight_file_is_fatal() {
    let result = BigramWeights::load(Path::new("/definitely/not/here.tsv"), WeightTransform::Raw).await;
    assert!(result.is_err());
}
