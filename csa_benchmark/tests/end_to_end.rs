use std::{fs, path::{Path, PathBuf}};

use csa::{TextIndex, Variant};
use csa_benchmark::{driver::{Conf, Driver, Operation}, timer::{ClockKind, WallClock}, workload::Workload};

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("csa_benchmark_end_to_end_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn summaries(path: &Path) -> Vec<usize> {
    fs::read_to_string(path).unwrap().lines().map(|line| {
        let (summary, latency) = line.split_once('\t').expect("line without tab");
        assert!(latency.parse::<u64>().is_ok(), "latency {latency} is not a non-negative integer");
        summary.parse().unwrap()
    }).collect()
}

#[test]
fn test_build_load_preserves_length() {
    let dir = test_dir("build");
    let text: Vec<u8> = b"she sells sea shells by the sea shore\n".iter().copied().cycle().take(10_000).collect();
    for code in [0, 1, 2, -1] {
        let path = dir.join(format!("text{code}.csa"));
        let built = csa::build(Variant::from_code(code), &text);
        csa::store_to_file(&*built, &path).unwrap();
        let loaded = csa::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), text.len());
        assert_eq!(loaded.variant(), Variant::from_code(code));
        assert!(csa::size_in_mega_bytes(&*loaded) > 0.0);
        assert_eq!(loaded.count(b"sea"), built.count(b"sea"));
        let mut tmp = path.into_os_string();
        tmp.push(".tmp");
        assert!(!Path::new(&tmp).exists());
    }
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_store_to_unwritable_path_fails() {
    let index = csa::build(Variant::WaveletTree, b"abc");
    let path = std::env::temp_dir().join("csa_benchmark_no_such_directory").join("nested").join("x.csa");
    assert!(csa::store_to_file(&*index, &path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_count_foo_bar_baz() {
    let dir = test_dir("count");
    let index_path = dir.join("text.csa");
    let queries_path = dir.join("queries.tsv");
    csa::store_to_file(&*csa::build(Variant::EncodedVector, b"foo baz, then baz again"), &index_path).unwrap();
    fs::write(&queries_path, "a\tfoo\nb\tbar\nc\tbaz\n").unwrap();

    let index = csa::load_from_file(&index_path).unwrap();
    let workload = Workload::load(&queries_path, None).unwrap();
    let conf = Conf { output_dir: dir.clone(), ..Default::default() };
    let driver = Driver::new(&*index, &index_path, &workload, &conf);
    driver.run_all(&[Operation::Count], ClockKind::Both).unwrap();

    assert_eq!(summaries(&dir.join("text.csa.count")), [1, 0, 2]);
    assert_eq!(summaries(&dir.join("text.csa.count.ticks")), [1, 0, 2]);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_all_operations_and_rerun_overwrites() {
    let dir = test_dir("all");
    let text: Vec<u8> = (0..20_000u32).map(|i| b"abcdefgh"[(i.wrapping_mul(2654435761) >> 29) as usize]).collect();
    let index_path = dir.join("random.csa");
    csa::store_to_file(&*csa::build(Variant::WaveletTree, &text), &index_path).unwrap();
    let queries: Vec<Vec<u8>> = (0..50).map(|i| text[i * 300..i * 300 + 1 + i % 4].to_vec()).collect();

    let index = csa::load_from_file(&index_path).unwrap();
    let workload = Workload { queries: queries.iter().map(|q| Box::from(&q[..])).collect(), ranges: None };
    let conf = Conf { trials: 2000, warmup_random: 100, warmup_queries: 10, output_dir: dir.clone(), ..Default::default() };
    let driver = Driver::new(&*index, &index_path, &workload, &conf);
    for _ in 0..2 {
        driver.run_all(&Operation::ALL, ClockKind::Wall).unwrap();
        for operation in [Operation::Npa, Operation::Isa, Operation::Sa, Operation::Extract] {
            let samples = summaries(&driver.output_path::<WallClock>(operation));
            assert_eq!(samples.len(), 2000, "wrong number of {operation} samples");
        }
        let counts = summaries(&driver.output_path::<WallClock>(Operation::Count));
        let found = summaries(&driver.output_path::<WallClock>(Operation::Search));
        assert_eq!(counts.len(), queries.len());
        assert_eq!(counts, found);
        for (query, count) in queries.iter().zip(counts) {
            assert_eq!(count, text.windows(query.len()).filter(|w| *w == &query[..]).count());
        }
    }
    fs::remove_dir_all(&dir).unwrap();
}
