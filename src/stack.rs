//! Host stack growth for the recursive passes.
//!
//! Parsing, resolving and evaluating all recurse once per nesting level of
//! the program, and every Lox call adds several host frames.  Each recursive
//! entry point runs through [`ensure_sufficient_stack`], which moves onto a
//! freshly allocated stack segment when the current one is nearly used up.
//! Depth is then bounded only by the interpreter's call-depth limit.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const GROWTH: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursion_far_past_the_thread_stack() {
        fn depth(n: u64) -> u64 {
            // Pad the frame so a plain 2 MiB test thread would overflow.
            let pad = std::hint::black_box([0u8; 512]);
            ensure_sufficient_stack(|| if n == 0 { pad[0] as u64 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(50_000), 50_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
        assert_eq!(result, Err("boom"));
    }
}
