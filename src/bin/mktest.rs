/// mktest — generate deterministic media fixtures under testdata/
///
/// Run with: cargo run --bin mktest
///
/// Wipes and recreates testdata/ from scratch. Expected outcomes:
///   zero.bin           131072 zero bytes   — 0000000000020000
///   short.bin          131071 zero bytes   — too small to hash
///   pattern.mkv        300000 bytes        — same hash as season1/pattern_copy.mkv
///   middle_differs.mkv 300000 bytes        — same hash as pattern.mkv (only the middle changed)
///   notes.txt          small text          — skipped by scan

use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    let root = Path::new("testdata");

    // Wipe and recreate
    if root.exists() {
        fs::remove_dir_all(root).expect("remove testdata");
    }
    fs::create_dir_all(root).expect("create testdata");

    write_file(&root.join("zero.bin"), &vec![0u8; 128 * 1024]);
    write_file(&root.join("short.bin"), &vec![0u8; 128 * 1024 - 1]);

    let pattern: Vec<u8> = (0..300_000u32).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    write_file(&root.join("pattern.mkv"), &pattern);

    let mut middle = pattern.clone();
    middle[150_000] ^= 0xFF;
    write_file(&root.join("middle_differs.mkv"), &middle);

    let season = root.join("season1");
    fs::create_dir_all(&season).expect("create season1");
    write_file(&season.join("pattern_copy.mkv"), &pattern);

    write_file(&root.join("notes.txt"), b"not a movie\n");
    write_file(&root.join(".hidden.mkv"), &pattern);

    println!("Test data created under testdata/");
    println!();
    println!("Expected:");
    println!("  zero.bin            0000000000020000");
    println!("  short.bin           too small (131071 bytes)");
    println!("  pattern.mkv         == season1/pattern_copy.mkv == middle_differs.mkv");
    println!();
    println!("Test commands:");
    println!("  cargo run -- hash testdata/zero.bin testdata/short.bin");
    println!("  cargo run -- hash --json testdata/pattern.mkv testdata/middle_differs.mkv");
    println!("  cargo run -- scan testdata --recursive --include '*.mkv'");
    println!("  cargo run -- scan testdata --recursive --hidden --json");
    println!();
    println!("Remote: serve testdata/ with any server that sends Accept-Ranges: bytes, then");
    println!("  cargo run -- -v hash http://127.0.0.1:8000/pattern.mkv");
}

fn write_file(path: &Path, content: &[u8]) {
    let mut f = fs::File::create(path)
        .unwrap_or_else(|e| panic!("create {}: {}", path.display(), e));
    f.write_all(content)
        .unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
}
