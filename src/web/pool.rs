use crate::web::context::Context;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Bounded free list of request contexts.
pub struct ContextPool {
    free: Mutex<Vec<Context>>,
    capacity: usize,
}

impl ContextPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take a context. It goes back to the pool, reset, when the guard drops.
    pub fn acquire(&self) -> PooledContext<'_> {
        let ctx = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        PooledContext { pool: self, ctx }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of idle contexts.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.capacity {
            free.push(ctx);
        }
    }
}

/// Scoped guard over a pooled [`Context`].
pub struct PooledContext<'a> {
    pool: &'a ContextPool,
    ctx: Context,
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::context::HostRequest;
    use crate::web::i18n::MessageCatalog;
    use std::sync::Arc;
    use axum::http::{Method, StatusCode};

    #[test]
    fn test_released_context_is_reset() {
        let pool = ContextPool::new(2);
        {
            let mut ctx = pool.acquire();
            ctx.attach(
                HostRequest::new(Method::GET, "/a".parse().unwrap()),
                Arc::new(MessageCatalog::new()),
                "en".to_string(),
            );
            ctx.set_status(StatusCode::NOT_FOUND);
            ctx.write_text("missing");
        }
        assert_eq!(pool.idle(), 1);

        let ctx = pool.acquire();
        assert_eq!(pool.idle(), 0);
        assert_eq!(format!("{:?}", *ctx), format!("{:?}", Context::default()));
    }

    #[test]
    fn test_capacity_bounds_idle_contexts() {
        let pool = ContextPool::new(1);
        let first = pool.acquire();
        let second = pool.acquire();
        drop(first);
        drop(second);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_context_released_on_panic() {
        let pool = ContextPool::new(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut ctx = pool.acquire();
            ctx.write_text("partial");
            panic!("controller failed");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire().buffered_body().is_empty());
    }
}
