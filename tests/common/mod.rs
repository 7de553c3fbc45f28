pub mod app;
pub mod factory;

#[allow(unused_imports)]
pub use app::{test_config, StubRenderer, TestApp};
#[allow(unused_imports)]
pub use factory::Factory;
