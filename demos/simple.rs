//! A simple example showing the use of a Bloom filter.
use bitbloom::BloomFilter;

fn main() -> Result<(), bitbloom::Error> {
    let capacity = 128;
    let bf = BloomFilter::with_capacity(capacity)?;

    bf.insert("foo")?;
    bf.insert("bar")?;

    println!("foo: {}", bf.contains("foo")?); // true
    println!("bar: {}", bf.contains("bar")?); // true
    println!("baz: {}", bf.contains("baz")?); // false

    println!("count: {}", bf.count()?); // 2
    println!(
        "{} bits, {} hashes, expected false positive rate at capacity: {:.4}",
        bf.bits(),
        bf.hashes(),
        bf.false_positive_rate(capacity)
    );

    Ok(())
}
