mod helpers;
use helpers::*;
use ayalog::{info, InvocationMode};

const N_THREADS: usize = 4;
const N_LINES: usize = 50;

#[test]
fn lines_are_atomic_under_concurrency() {
    for mode in MODES {
        let mem = Mem::default();
        let lg = terminal_builder(mode, &mem)
            .show_function_name(false)
            .show_file_name(false)
            .build()
            .unwrap();

        std::thread::scope(|s| {
            for t in 0..N_THREADS {
                let lg = &lg;
                s.spawn(move || {
                    for i in 0..N_LINES {
                        info!(lg, format!("T{t} #{i}")).unwrap();
                    }
                });
            }
        });

        let lines = mem.lines();
        assert_eq!(lines.len(), N_THREADS * N_LINES, "{mode:?}");
        // Each line must be whole; no partial writes
        for l in &lines {
            assert!(l.starts_with("[info]: \"T"), "{mode:?}: {l}");
            assert!(l.ends_with('"'), "{mode:?}: {l}");
        }
    }
}

#[test]
fn logger_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ayalog::Logger>();
    let _ = InvocationMode::Direct;
}
