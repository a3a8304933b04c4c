#![allow(dead_code)]

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}
