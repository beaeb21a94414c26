use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use ranked_collections::skiplist::RankedSet;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 1000;

fn bench_btreemap_insert(c: &mut Criterion) {
    c.bench_function("bench btreemap insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut map = BTreeMap::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                map.insert(key, val);
            }
        })
    });
}

fn bench_ranked_set_insert(c: &mut Criterion) {
    c.bench_function("bench ranked set insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut set = RankedSet::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                set.insert(key, val);
            }
        })
    });
}

fn bench_ranked_set_rescore(c: &mut Criterion) {
    c.bench_function("bench ranked set rescore", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut set = RankedSet::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32() % 128;
                let val = rng.next_u32();

                set.insert(key, val);
            }
        })
    });
}

fn bench_ranked_set_mixed(c: &mut Criterion) {
    c.bench_function("bench ranked set mixed", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut set = RankedSet::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32() % 512;
                let val = rng.next_u32();

                if rng.next_u32() % 10 < 7 {
                    set.insert(key, val);
                } else {
                    set.remove(&key);
                }
            }
        })
    });
}

fn bench_ranked_set_rank_of(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut set = RankedSet::new();
    let mut keys = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        let val = rng.next_u32();

        set.insert(key, val);
        keys.push(key);
    }

    c.bench_function("bench ranked set rank_of", move |b| {
        b.iter(|| {
            for key in &keys {
                black_box(set.rank_of(key));
            }
        })
    });
}

fn bench_ranked_set_get_by_rank(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut set = RankedSet::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        let val = rng.next_u32();

        set.insert(key, val);
    }

    let len = set.len();
    c.bench_function("bench ranked set get_by_rank", move |b| {
        b.iter(|| {
            for rank in 1..=len {
                black_box(set.get_by_rank(rank));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_btreemap_insert,
    bench_ranked_set_insert,
    bench_ranked_set_rescore,
    bench_ranked_set_mixed,
    bench_ranked_set_rank_of,
    bench_ranked_set_get_by_rank,
);
criterion_main!(benches);
