#[cfg(feature = "javascript")]
mod javascript;

#[cfg(feature = "javascript")]
pub use javascript::JavaScriptSandbox;

mod cpp;
mod preview;
mod python;

pub use cpp::CppSimulator;
pub use preview::PreviewStrategy;
pub use python::PythonSimulator;
