mod helpers;

use std::num::NonZeroUsize;

use helpers::{write_csv, RecordingProvider, StubProvider, STUB_DIMS};
use ndarray::Array2;
use ndarray_npy::read_npy;
use tweet_embed::dataset::{format_all, load_records};
use tweet_embed::encoder::{write_matrix, Encoder};

fn batch(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn end_to_end_csv_to_npy() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "tweets.csv",
        "id,keyword,location,text\n\
         1,fire,NYC,Fire downtown\n\
         2,,,Just walking the dog\n\
         3,flood,,Water rising fast\n",
    );

    let records = load_records(&csv).unwrap();
    let strings = format_all(&records);

    let provider = StubProvider;
    let encoder = Encoder::new(&provider, batch(2));
    let matrix = encoder.encode(&strings).unwrap();
    assert_eq!(matrix.shape(), &[3, STUB_DIMS]);

    let out = dir.path().join("data").join("encoded_vectors.npy");
    write_matrix(&matrix, &out).unwrap();

    let loaded: Array2<f32> = read_npy(&out).unwrap();
    assert_eq!(loaded, matrix);

    // row i of the matrix is the embedding of string i
    for (i, s) in strings.iter().enumerate() {
        let expected = provider_vector(s);
        assert_eq!(loaded.row(i).to_vec(), expected, "row {i} misaligned");
    }
}

fn provider_vector(s: &str) -> Vec<f32> {
    use tweet_embed::embedding::EmbeddingProvider;
    StubProvider.embed(s).unwrap()
}

#[test]
fn batching_is_invariant_over_batch_size() {
    let strings: Vec<String> = (0..25)
        .map(|i| format!("Tweet ID: {i}, Keyword: N/A, Location: N/A, Text: event {i}."))
        .collect();

    let provider = StubProvider;
    let one_batch = Encoder::new(&provider, batch(100)).encode(&strings).unwrap();
    let small = Encoder::new(&provider, batch(3)).encode(&strings).unwrap();
    let singles = Encoder::new(&provider, batch(1)).encode(&strings).unwrap();

    assert_eq!(one_batch, small);
    assert_eq!(one_batch, singles);
}

#[test]
fn provider_receives_bounded_batches() {
    let strings: Vec<String> = (0..7).map(|i| format!("tweet {i}")).collect();

    let provider = RecordingProvider::new();
    Encoder::new(&provider, batch(3)).encode(&strings).unwrap();

    let sizes = provider.batch_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![3, 3, 1]);
}

#[test]
fn two_runs_produce_bit_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let strings: Vec<String> = (0..10).map(|i| format!("tweet {i}")).collect();
    let provider = StubProvider;
    let encoder = Encoder::new(&provider, batch(4));

    let out_a = dir.path().join("a.npy");
    let out_b = dir.path().join("b.npy");
    write_matrix(&encoder.encode(&strings).unwrap(), &out_a).unwrap();
    write_matrix(&encoder.encode(&strings).unwrap(), &out_b).unwrap();

    assert_eq!(
        std::fs::read(&out_a).unwrap(),
        std::fs::read(&out_b).unwrap()
    );
}

#[test]
fn write_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vectors.npy");

    let first = Array2::<f32>::ones((4, STUB_DIMS));
    let second = Array2::<f32>::zeros((2, STUB_DIMS));
    write_matrix(&first, &out).unwrap();
    write_matrix(&second, &out).unwrap();

    let loaded: Array2<f32> = read_npy(&out).unwrap();
    assert_eq!(loaded, second);
}

#[test]
fn write_leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vectors.npy");
    write_matrix(&Array2::<f32>::zeros((1, STUB_DIMS)), &out).unwrap();

    let entries: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["vectors.npy".to_string()]);
}

#[test]
fn empty_table_writes_zero_row_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "empty.csv", "id,keyword,location,text\n");

    let records = load_records(&csv).unwrap();
    let strings = format_all(&records);

    let provider = StubProvider;
    let matrix = Encoder::new(&provider, batch(100)).encode(&strings).unwrap();
    assert_eq!(matrix.shape(), &[0, STUB_DIMS]);

    let out = dir.path().join("empty.npy");
    write_matrix(&matrix, &out).unwrap();
    let loaded: Array2<f32> = read_npy(&out).unwrap();
    assert_eq!(loaded.shape(), &[0, STUB_DIMS]);
}
