mod summary;

pub use self::summary::*;
