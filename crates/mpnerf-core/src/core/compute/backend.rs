use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Array-computation interface every stage of the pipeline is written against.
///
/// A backend evaluates an indexed kernel over `0..len` and collects the results in
/// index order. Implementations differ only in how the indices are scheduled, so any
/// two backends produce identical output for the same kernel.
pub trait Backend: Sync {
    fn name(&self) -> &'static str;

    fn map<T, F>(&self, len: usize, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;

    /// Like [`Backend::map`], but fails with the error of the lowest failing index.
    fn try_map<T, E, F>(&self, len: usize, kernel: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(usize) -> Result<T, E> + Sync + Send,
    {
        self.map(len, kernel).into_iter().collect()
    }
}

/// Runs every kernel on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl Backend for Serial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn map<T, F>(&self, len: usize, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        (0..len).map(kernel).collect()
    }

    fn try_map<T, E, F>(&self, len: usize, kernel: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(usize) -> Result<T, E> + Sync + Send,
    {
        (0..len).map(kernel).collect()
    }
}

/// Data-parallel backend on the global rayon pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Rayon;

#[cfg(feature = "parallel")]
impl Backend for Rayon {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn map<T, F>(&self, len: usize, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        (0..len).into_par_iter().map(kernel).collect()
    }
}

/// Selects a backend at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Serial,
    Parallel,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "parallel") {
            Self::Parallel
        } else {
            Self::Serial
        }
    }
}

impl BackendKind {
    /// Whether this build can honour the selection.
    pub fn is_available(self) -> bool {
        match self {
            Self::Serial => true,
            Self::Parallel => cfg!(feature = "parallel"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(Self::Serial),
            "parallel" | "rayon" => Ok(Self::Parallel),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}
