fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    if let Err(e) = built::write_built_file() {
        println!("cargo:warning=Failed to acquire build-time information: {e}");
    }
}
