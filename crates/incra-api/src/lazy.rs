use std::fmt;
use std::sync::{Arc, OnceLock};

/// A single-shot memoized thunk.
///
/// `Structure.{parents,declared,inherited}` (§4.6, §9) are the motivating
/// use: most stored APIs are never fully walked in a given run, so the codec
/// constructs these as `Lazy::pending` thunks that capture the still-encoded
/// bytes and a decoder, and only pay the decode cost the first time an API
/// differ or downstream consumer calls [`Lazy::force`]. After forcing, the
/// captured bytes can be dropped (`bytes` is the only thing keeping them
/// alive).
pub struct Lazy<T> {
    forced: OnceLock<T>,
    pending: Option<PendingThunk<T>>,
}

struct PendingThunk<T> {
    bytes: Arc<[u8]>,
    decode: Arc<dyn Fn(&[u8]) -> T + Send + Sync>,
}

impl<T> Lazy<T> {
    /// Wrap an already-computed value. Equivalent to a thunk that has
    /// already been forced.
    pub fn forced(value: T) -> Self {
        let forced = OnceLock::new();
        let _ = forced.set(value);
        Self {
            forced,
            pending: None,
        }
    }

    /// Build a thunk over `bytes`, decoded on first force by `decode`.
    pub fn pending(bytes: Arc<[u8]>, decode: impl Fn(&[u8]) -> T + Send + Sync + 'static) -> Self {
        Self {
            forced: OnceLock::new(),
            pending: Some(PendingThunk {
                bytes,
                decode: Arc::new(decode),
            }),
        }
    }

    /// Force the thunk, computing (and caching) the value on first call.
    pub fn force(&self) -> &T {
        self.forced.get_or_init(|| {
            let pending = self
                .pending
                .as_ref()
                .expect("Lazy forced without a cached value or pending thunk");
            (pending.decode)(&pending.bytes)
        })
    }

    pub fn is_forced(&self) -> bool {
        self.forced.get().is_some()
    }
}

impl<T: Clone> Lazy<T> {
    pub fn into_inner(self) -> T {
        self.force();
        self.forced.into_inner().expect("forced above")
    }
}

impl<T: Clone> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            forced: {
                let cell = OnceLock::new();
                if let Some(value) = self.forced.get() {
                    let _ = cell.set(value.clone());
                }
                cell
            },
            pending: self.pending.as_ref().map(|p| PendingThunk {
                bytes: p.bytes.clone(),
                decode: p.decode.clone(),
            }),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.forced.get() {
            Some(value) => f.debug_tuple("Lazy::Forced").field(value).finish(),
            None => f.write_str("Lazy::Pending"),
        }
    }
}

/// Equality forces both sides, per the round-trip law in §8: `decode(encode(A)) == A`
/// "modulo lazy thunks are forced pre-compare".
impl<T: PartialEq> PartialEq for Lazy<T> {
    fn eq(&self, other: &Self) -> bool {
        self.force() == other.force()
    }
}
impl<T: Eq> Eq for Lazy<T> {}

impl<T: serde::Serialize> serde::Serialize for Lazy<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.force().serialize(serializer)
    }
}

impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Lazy<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Lazy::forced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn forces_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let bytes: Arc<[u8]> = Arc::from(vec![1, 2, 3].into_boxed_slice());
        let lazy = Lazy::pending(bytes, move |b| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            b.len()
        });
        assert!(!lazy.is_forced());
        assert_eq!(*lazy.force(), 3);
        assert_eq!(*lazy.force(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn equality_forces_both_sides() {
        let a = Lazy::forced(5);
        let bytes: Arc<[u8]> = Arc::from(vec![5].into_boxed_slice());
        let b = Lazy::pending(bytes, |b| b[0] as i32);
        assert_eq!(a, b);
    }
}
