use passage_core::store::term_frequencies;
use passage_core::PassageStore;
use proptest::prelude::*;

proptest! {
    #[test]
    fn online_mean_equals_batch_mean(lengths in prop::collection::vec(0u32..60, 1..80)) {
        let mut store = PassageStore::new();
        for len in &lengths {
            store.add_passage(term_frequencies((0..*len).map(|i| format!("t{}", i % 7)))).unwrap();
        }
        let batch = lengths.iter().map(|&l| l as f64).sum::<f64>() / lengths.len() as f64;
        let online = store.average_length().unwrap();
        prop_assert!((online - batch).abs() < 1e-9 * batch.max(1.0));
    }
}
