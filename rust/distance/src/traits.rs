/// A query-fixed distance functor: `fix_argument` performs query-side
/// work once (e.g. caching a bias-adjusted copy) so that repeated
/// `compute` calls against many data points amortize it.
///
/// Implementors are cheaply `Clone`; `shallow_copy` is the explicit,
/// named way to obtain a second handle for another thread without
/// sharing the first's fixed-argument state (mirrors the distinction the
/// reference implementation draws between a plain copy and a
/// thread-local working copy).
pub trait Distance: Clone {
    /// Caches any per-query state needed by subsequent `compute` calls.
    fn fix_argument(&mut self, query: &[f32]);

    /// Distance between the fixed query and `datum`.
    fn compute(&self, datum: &[f32]) -> f32;

    /// An independent copy for use on another thread. The default clones;
    /// override only if a functor holds state that must not be shared
    /// (e.g. a scratch buffer reused across `compute` calls).
    fn shallow_copy(&self) -> Self {
        self.clone()
    }
}
