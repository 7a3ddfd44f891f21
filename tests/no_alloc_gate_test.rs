use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use stack_tower::core::{Autopilot, StackConfig, StackSession, StackSnapshot};

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = layout;
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = (layout, new_size);
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn core_hot_paths_do_not_allocate() {
    // Setup (outside counting) so one-time allocations don't trip the gate.
    // The pool is sized so the gate never takes the growth path.
    let config = StackConfig {
        pool_initial_size: 256,
        ..StackConfig::default()
    };
    let mut session = StackSession::new(config).unwrap();
    let mut pilot = Autopilot::new(7, 0.15);
    let mut snap = StackSnapshot::default();

    // Warm-up.
    session.advance(1.0 / 60.0);
    session.snapshot_into(&mut snap);

    let allocs = with_alloc_counting(|| {
        for _ in 0..20_000 {
            session.advance(1.0 / 60.0);
            if pilot.should_place(&session) {
                let _ = session.attempt_place();
            }
            session.snapshot_into(&mut snap);
            if session.is_game_over() {
                session.reset();
            }
        }

        // Direct presses drive the cooldown and trimming paths.
        for i in 0..200 {
            let _ = session.seek_active((i % 7) as f32 * 0.1);
            let _ = session.attempt_place();
            session.advance(0.25);
            if session.is_game_over() {
                session.reset();
            }
        }
    });

    assert_eq!(allocs, 0);
}
