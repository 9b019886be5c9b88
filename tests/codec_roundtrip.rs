use tempfile::TempDir;

use anekdex::bench::CodecBench;
use anekdex::codec::Encoding;
use anekdex::config::{BenchConfig, IndexSettings};
use anekdex::engine::{NativeFormat, Snapshot};
use anekdex::models::{document, SearchParams};
use anekdex::SearchIndex;

const QUERIES: [&str; 5] = ["Иваныч", "бар", "приходит", "штирлиц", "лес"];

fn jokes_index() -> SearchIndex {
    let mut index = SearchIndex::new(IndexSettings::default());
    let jokes = [
        "Иваныч приходит в бар",
        "Бармен говорит Иванычу: тебе как обычно?",
        "Штирлиц шёл по лесу и увидел бар",
        "Штирлиц выстрелил вслепую. Слепая упала.",
        "Приходит мужик в магазин",
    ];
    for joke in jokes {
        index.insert(document("joke", joke)).unwrap();
    }
    index
}

fn all_encodings() -> Vec<Encoding> {
    BenchConfig::default().encodings()
}

fn reload(snapshot: Snapshot) -> SearchIndex {
    let mut index = SearchIndex::new(IndexSettings::default());
    index.load(snapshot).unwrap();
    index
}

#[test]
fn every_encoding_preserves_search_results() {
    let source = jokes_index();
    let snapshot = source.save();

    for encoding in all_encodings() {
        let bytes = encoding.encode(&snapshot).unwrap();
        let restored = reload(encoding.decode(&bytes, source.schema()).unwrap());

        for query in QUERIES {
            let params = SearchParams::new(query).with_properties(["joke"]);
            let expected = source.search(&params).unwrap();
            let actual = restored.search(&params).unwrap();
            assert_eq!(expected.count, actual.count, "{} / {}", encoding, query);
            assert_eq!(expected.hits, actual.hits, "{} / {}", encoding, query);
        }
    }
}

#[test]
fn reloaded_index_keeps_assigning_fresh_ids() {
    let source = jokes_index();
    let bytes = Encoding::Protobuf.encode(&source.save()).unwrap();
    let mut restored = reload(Encoding::Protobuf.decode(&bytes, source.schema()).unwrap());

    let id = restored.insert(document("joke", "Новый анекдот")).unwrap();
    assert_eq!(id, "6");
}

#[test]
fn empty_snapshot_roundtrips_to_valid_empty_index() {
    let empty = SearchIndex::new(IndexSettings::default()).save();

    for encoding in all_encodings() {
        let bytes = encoding.encode(&empty).unwrap();
        let decoded = encoding.decode(&bytes, &empty.schema).unwrap();
        assert_eq!(decoded, empty, "{}", encoding);
        assert!(decoded.validate().is_ok());

        let index = reload(decoded);
        assert!(index.is_empty());
        assert_eq!(index.search(&SearchParams::new("бар")).unwrap().count, 0);
    }
}

#[test]
fn native_formats_reject_corruption() {
    let snapshot = jokes_index().save();

    for format in [NativeFormat::Binary, NativeFormat::Dpack] {
        let encoding = Encoding::Native(format);
        let mut bytes = encoding.encode(&snapshot).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(encoding.decode(&bytes, &snapshot.schema).is_err(), "{}", format);
    }
}

#[test]
fn compression_sweep_sizes() {
    let snapshot = jokes_index().save();
    let json_len = Encoding::Json.encode(&snapshot).unwrap().len();

    let sweeps = [
        vec![Encoding::Gzip(1), Encoding::Gzip(6), Encoding::Gzip(9)],
        vec![Encoding::Brotli(0), Encoding::Brotli(5), Encoding::Brotli(11)],
    ];
    for sweep in sweeps {
        let sizes: Vec<usize> = sweep
            .iter()
            .map(|e| e.encode(&snapshot).unwrap().len())
            .collect();
        for (encoding, size) in sweep.iter().zip(&sizes).skip(1) {
            // Advisory only: small inputs do not always compress monotonically
            if *size > sizes[0] {
                eprintln!(
                    "warning: {} ({} bytes) is larger than {} ({} bytes)",
                    encoding, size, sweep[0], sizes[0]
                );
            }
        }
        assert!(sizes.iter().all(|&s| s < json_len));
    }
}

#[tokio::test]
async fn bench_run_writes_every_encoding() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("anekdots.txt");
    std::fs::write(
        &corpus,
        "<|startoftext|>Иваныч приходит в бар\n<|startoftext|>Бармен\nналивает\n",
    )
    .unwrap();

    let config = BenchConfig::new(tmp.path().join("data")).with_corpus(corpus);
    let bench = CodecBench::new(config.clone(), IndexSettings::default());
    let report = bench.run().await.unwrap();

    assert_eq!(report.documents, 2);
    assert!(report.index_time.is_some());
    assert_eq!(report.records.len(), config.encodings().len());
    for record in &report.records {
        assert!(record.file.exists(), "{:?}", record.file);
        assert_eq!(record.verified, Some(true), "{}", record.encoding);
        assert!(record.size_bytes > 0);
    }
    assert!(report.render_table().contains("protobuf"));
}

#[tokio::test]
async fn bench_reads_existing_index_json() {
    let tmp = TempDir::new().unwrap();
    let data_dir = tmp.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let json = Encoding::Json.encode(&jokes_index().save()).unwrap();
    std::fs::write(data_dir.join("index.json"), json).unwrap();

    let config = BenchConfig::new(data_dir)
        .with_gzip_levels(vec![9])
        .with_brotli_qualities(vec![]);
    let report = CodecBench::new(config, IndexSettings::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.documents, 5);
    assert!(report.index_time.is_none());
    assert!(report.record(Encoding::Gzip(9)).is_some());
    assert!(report.record(Encoding::Brotli(11)).is_none());
}

#[tokio::test]
async fn bench_survives_missing_corpus() {
    let tmp = TempDir::new().unwrap();
    let config = BenchConfig::new(tmp.path().join("data"))
        .with_corpus(tmp.path().join("missing.txt"))
        .with_gzip_levels(vec![1])
        .with_brotli_qualities(vec![0]);

    let report = CodecBench::new(config, IndexSettings::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.documents, 0);
    assert!(report.records.iter().all(|r| r.verified == Some(true)));
}

fn corpus_with_invalid_utf8(tmp: &TempDir) -> std::path::PathBuf {
    let mut corpus = b"<|startoftext|>A\n<|startoftext|>B\n".to_vec();
    corpus.extend_from_slice(&[0xFF, 0xFE, b'\n']);
    let path = tmp.path().join("anekdots.txt");
    std::fs::write(&path, corpus).unwrap();
    path
}

#[tokio::test]
async fn bench_continues_after_corpus_read_failure() {
    let tmp = TempDir::new().unwrap();
    let config = BenchConfig::new(tmp.path().join("data"))
        .with_corpus(corpus_with_invalid_utf8(&tmp))
        .with_gzip_levels(vec![1])
        .with_brotli_qualities(vec![0]);

    let report = CodecBench::new(config, IndexSettings::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.documents, 1);
    assert!(report.record(Encoding::Json).is_some());
}

#[tokio::test]
async fn index_json_is_written_after_corpus_read_failure() {
    let tmp = TempDir::new().unwrap();
    let config = BenchConfig::new(tmp.path().join("data"))
        .with_corpus(corpus_with_invalid_utf8(&tmp));

    let (documents, path) = CodecBench::new(config, IndexSettings::default())
        .write_index_json()
        .await
        .unwrap();

    assert_eq!(documents, 1);
    assert_eq!(path, tmp.path().join("data").join("index.json"));
    let bytes = std::fs::read(&path).unwrap();
    let snapshot = Encoding::Json
        .decode(&bytes, &IndexSettings::default().schema)
        .unwrap();
    let index = reload(snapshot);
    assert_eq!(index.get_document("1").unwrap()["joke"], "A");
}
