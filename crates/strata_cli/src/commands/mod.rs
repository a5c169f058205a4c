pub(crate) mod meta;

#[cfg(feature = "github")]
pub(crate) mod count;
#[cfg(feature = "github")]
pub(crate) mod limits;
#[cfg(feature = "github")]
pub(crate) mod sample;
#[cfg(feature = "github")]
pub(crate) mod shared;
