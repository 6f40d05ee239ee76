pub mod complex;
pub mod driver;
pub mod error;
pub mod fabric;
pub mod fifo;
pub mod pe;
pub mod pipeline;
pub mod reference;
pub mod ring;
pub mod shuffle;
pub mod timing;
pub mod twiddle;
pub mod wrapper;

pub use complex::Complex;
pub use driver::Driver;
pub use error::{SimError, SimResult};
pub use wrapper::{FftWrapper, WrapperConfig};
