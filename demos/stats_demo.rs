use clap::Parser;
use clap::ValueEnum;
use leapfrog_hash::Error;
use leapfrog_hash::HashMap;
use leapfrog_hash::hash_fn::BuildFnv1aHasher;
use leapfrog_hash::hash_fn::BuildJenkinsHasher;
use leapfrog_hash::hash_fn::BuildSaxHasher;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Hash {
    Sax,
    Jenkins,
    Fnv1a,
    Random,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 1000)]
    capacity: usize,

    #[arg(long = "hash", value_enum, default_value_t = Hash::Fnv1a)]
    hash: Hash,
}

/// Inserts string keys until the map refuses one, then prints its chains.
fn fill<S: core::hash::BuildHasher + Default>(capacity: usize) -> Result<(), Error> {
    let mut map: HashMap<String, u64, S> = HashMap::with_capacity(capacity)?;

    let mut stopped_by = None;
    for i in 0..capacity as u64 {
        if let Err(err) = map.insert(format!("key_{i:016X}"), i) {
            stopped_by = Some(err);
            break;
        }
    }

    println!("Inserted {} keys into {} buckets", map.len(), map.capacity());
    match stopped_by {
        Some(err) => println!("Stopped early: {err}"),
        None => println!("Filled every bucket"),
    }
    map.chain_stats().print();
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    println!(
        "Filling a map with {} buckets using {:?}",
        args.capacity, args.hash
    );

    match args.hash {
        Hash::Sax => fill::<BuildSaxHasher>(args.capacity),
        Hash::Jenkins => fill::<BuildJenkinsHasher>(args.capacity),
        Hash::Fnv1a => fill::<BuildFnv1aHasher>(args.capacity),
        Hash::Random => fill::<leapfrog_hash::DefaultHashBuilder>(args.capacity),
    }
}
