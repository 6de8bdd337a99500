use alloc::format;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use leapfrog_hash::HashTable as LeapfrogHashTable;
use leapfrog_hash::hash_table::Entry as LeapfrogEntry;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

extern crate alloc;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 11),
    (1 << 12),
    (1 << 13),
    (1 << 14),
    (1 << 15),
    (1 << 16),
];

/// Bucket count giving the leapfrog table a 75% load once `len` entries are
/// in.
fn leapfrog_capacity(len: usize) -> usize {
    len * 4 / 3
}

/// Inserts or replaces `item`, doubling the table whenever a chain cannot be
/// extended.
fn leapfrog_upsert<T: KeyValuePair>(table: &mut LeapfrogHashTable<T>, hash: u64, item: T) {
    loop {
        match table.entry(hash, |v| v.eq_key(&item)) {
            Ok(LeapfrogEntry::Vacant(entry)) => {
                black_box(entry.insert(item));
                return;
            }
            Ok(LeapfrogEntry::Occupied(mut entry)) => {
                *entry.get_mut() = item;
                return;
            }
            Err(_) => {
                let doubled = (table.capacity() * 2).max(16);
                table
                    .rehash(doubled)
                    .expect("doubling always leaves room for a new entry");
            }
        }
    }
}

fn random_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let key = rng.try_next_u64().unwrap();
            let item = T::new(key);
            (item.hash_key(), item)
        })
        .collect()
}

fn sequential_items<T: KeyValuePair>(range: core::ops::Range<u64>) -> Vec<(u64, T)> {
    range
        .map(|key| {
            let item = T::new(key);
            (item.hash_key(), item)
        })
        .collect()
}

fn filled_leapfrog<T: KeyValuePair>(items: &[(u64, T)]) -> LeapfrogHashTable<T> {
    let mut table = LeapfrogHashTable::with_capacity(leapfrog_capacity(items.len())).unwrap();
    for (hash, item) in items.iter().cloned() {
        leapfrog_upsert(&mut table, hash, item);
    }
    table
}

fn filled_hashbrown<T: KeyValuePair>(items: &[(u64, T)]) -> HashbrownHashTable<T> {
    let mut table = HashbrownHashTable::with_capacity(items.len());
    for (hash, item) in items.iter().cloned() {
        table.insert_unique(hash, item, |v| v.hash_key());
    }
    table
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("leapfrog/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table =
                        LeapfrogHashTable::<TestItem>::with_capacity(leapfrog_capacity(size))
                            .unwrap();
                    for (hash, item) in hash_and_item {
                        leapfrog_upsert(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<TestItem>::with_capacity(size);
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(_) => unreachable!(),
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_miss_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let size = size as u64;
        let present = sequential_items::<TestItem>(0..size);
        let mut probes = sequential_items::<TestItem>(size / 2..size + size / 2);
        probes.shuffle(&mut SmallRng::from_os_rng());

        let leapfrog = filled_leapfrog(&present);
        let hashbrown = filled_hashbrown(&present);

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("leapfrog/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &probes {
                    black_box(leapfrog.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &probes {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(size);
        let mut removal_order = hash_and_item.clone();
        removal_order.shuffle(&mut SmallRng::from_os_rng());

        let leapfrog = filled_leapfrog(&hash_and_item);
        let hashbrown = filled_hashbrown(&hash_and_item);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("leapfrog/{size}"), |b| {
            b.iter_batched(
                || leapfrog.clone(),
                |mut table| {
                    for (hash, item) in &removal_order {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut table| {
                    for (hash, item) in &removal_order {
                        if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                            black_box(entry.remove().0);
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "iteration_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(size);
        let leapfrog = filled_leapfrog(&hash_and_item);
        let hashbrown = filled_hashbrown(&hash_and_item);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("leapfrog/{size}"), |b| {
            b.iter(|| {
                for item in leapfrog.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for item in hashbrown.iter() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert(u64),
    Remove(u64),
    Find(u64),
}

fn bench_mixed_probabilistic_zipf<TestItem: KeyValuePair, const MAX_SIZE: usize>(
    c: &mut Criterion,
) {
    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "mixed_probabilistic_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<TestItem>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES[..=MAX_SIZE].iter() {
            let mut rng = SmallRng::from_os_rng();
            let op_distr = Zipf::new(3.0, exponent).unwrap();
            let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();
            let find_remove_distr =
                Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();

            let operations = (0..size * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(op_distr);
                    if op_choice <= 1.0 {
                        Operation::Find(rng.sample(find_remove_distr) as u64)
                    } else if op_choice <= 2.0 {
                        Operation::Insert(rng.sample(insert_distr) as u64)
                    } else {
                        Operation::Remove(rng.sample(find_remove_distr) as u64)
                    }
                })
                .collect::<Vec<Operation>>();

            group.throughput(Throughput::Elements(operations.len() as u64));
            group.bench_function(format!("leapfrog/{size}"), |b| {
                b.iter(|| {
                    let mut table =
                        LeapfrogHashTable::<TestItem>::with_capacity(leapfrog_capacity(size))
                            .unwrap();
                    for &operation in &operations {
                        match operation {
                            Operation::Insert(key) => {
                                let item = TestItem::new(key);
                                leapfrog_upsert(&mut table, item.hash_key(), item);
                            }
                            Operation::Remove(key) => {
                                let item = TestItem::new(key);
                                black_box(table.remove(item.hash_key(), |v| v.eq_key(&item)));
                            }
                            Operation::Find(key) => {
                                let item = TestItem::new(key);
                                black_box(table.find(item.hash_key(), |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                })
            });

            group.bench_function(format!("hashbrown/{size}"), |b| {
                b.iter(|| {
                    let mut table = HashbrownHashTable::<TestItem>::with_capacity(size);
                    for &operation in &operations {
                        match operation {
                            Operation::Insert(key) => {
                                let item = TestItem::new(key);
                                let hash = item.hash_key();
                                match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                                    HashbrownEntry::Vacant(entry) => {
                                        black_box(entry.insert(item));
                                    }
                                    HashbrownEntry::Occupied(mut entry) => {
                                        *entry.get_mut() = item;
                                    }
                                }
                            }
                            Operation::Remove(key) => {
                                let item = TestItem::new(key);
                                if let Ok(entry) =
                                    table.find_entry(item.hash_key(), |v| v.eq_key(&item))
                                {
                                    black_box(entry.remove().0);
                                }
                            }
                            Operation::Find(key) => {
                                let item = TestItem::new(key);
                                black_box(table.find(item.hash_key(), |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                })
            });
        }

        group.finish();
    }
}

fn bench_churn<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let resident = random_items::<TestItem>(size / 2);
        let transient = random_items::<TestItem>(size / 2);

        let leapfrog = filled_leapfrog(&resident);
        let hashbrown = filled_hashbrown(&resident);

        group.throughput(Throughput::Elements(transient.len() as u64 * 2));
        group.bench_function(format!("leapfrog/{size}"), |b| {
            b.iter_batched(
                || leapfrog.clone(),
                |mut table| {
                    for (hash, item) in transient.iter().cloned() {
                        leapfrog_upsert(&mut table, hash, item);
                    }
                    for (hash, item) in &transient {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut table| {
                    for (hash, item) in transient.iter().cloned() {
                        table.insert_unique(hash, item, |v| v.hash_key());
                    }
                    for (hash, item) in &transient {
                        if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                            black_box(entry.remove().0);
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 6>,
    bench_insert_random::<TestItem, 6>,
    bench_find_hit_miss::<SmallTestItem, 6>,
    bench_find_hit_miss::<TestItem, 6>,
    bench_remove::<SmallTestItem, 6>,
    bench_remove::<TestItem, 6>,
    bench_iteration::<SmallTestItem, 6>,
    bench_iteration::<TestItem, 6>,
    bench_mixed_probabilistic_zipf::<SmallTestItem, 6>,
    bench_mixed_probabilistic_zipf::<TestItem, 6>,
    bench_churn::<SmallTestItem, 4>,
    bench_churn::<TestItem, 4>,
);

criterion_main!(benches);
