use super::backend::Backend;

/// An associative binary operation with a neutral element.
///
/// `combine` need not be commutative; scans always combine in left-to-right order.
pub trait Monoid: Sized {
    fn identity() -> Self;
    fn combine(&self, other: &Self) -> Self;
}

/// Inclusive left-to-right prefix product: `out[k] = items[0] · … · items[k]`.
pub fn sequential_scan<T: Monoid + Clone>(items: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    let mut running: Option<T> = None;
    for item in items {
        let next = match &running {
            Some(acc) => acc.combine(item),
            None => item.clone(),
        };
        out.push(next.clone());
        running = Some(next);
    }
    out
}

/// Inclusive prefix product in `O(log n)` parallel depth.
///
/// The input is cut into chunks of `block_size` (at least 2). Chunks are scanned
/// independently, their totals are scanned recursively, and every chunk is then
/// left-multiplied by the total of the chunks before it. The partition depends only on
/// `items.len()` and `block_size`, so results never depend on the thread count.
pub fn blocked_scan<B, T>(backend: &B, items: &[T], block_size: usize) -> Vec<T>
where
    B: Backend,
    T: Monoid + Clone + Send + Sync,
{
    let block_size = block_size.max(2);
    if items.len() <= block_size {
        return sequential_scan(items);
    }

    let chunks: Vec<&[T]> = items.chunks(block_size).collect();
    let local = backend.map(chunks.len(), |i| sequential_scan(chunks[i]));

    let totals: Vec<T> = local
        .iter()
        .map(|chunk| chunk.last().cloned().unwrap_or_else(T::identity))
        .collect();
    let offsets = blocked_scan(backend, &totals, block_size);

    let adjusted = backend.map(local.len(), |i| {
        if i == 0 {
            local[0].clone()
        } else {
            let offset = &offsets[i - 1];
            local[i].iter().map(|x| offset.combine(x)).collect()
        }
    });

    adjusted.into_iter().flatten().collect()
}

/// How the cumulative prefix product is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanStrategy {
    Sequential,
    Blocked { block_size: usize },
}

pub const DEFAULT_SCAN_BLOCK_SIZE: usize = 64;

impl Default for ScanStrategy {
    fn default() -> Self {
        Self::Blocked {
            block_size: DEFAULT_SCAN_BLOCK_SIZE,
        }
    }
}

impl ScanStrategy {
    pub fn scan<B, T>(&self, backend: &B, items: &[T]) -> Vec<T>
    where
        B: Backend,
        T: Monoid + Clone + Send + Sync,
    {
        match *self {
            Self::Sequential => sequential_scan(items),
            Self::Blocked { block_size } => blocked_scan(backend, items, block_size),
        }
    }
}
