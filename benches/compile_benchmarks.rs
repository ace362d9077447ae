//! Performance benchmarks for script compilation.
//!
//! Measures the full pipeline (lexing, parsing, code generation, linking)
//! on generated scripts of increasing size.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wzscript::{CompileOptions, HostFn, HostRegistry, NativeFunction, ScriptCompiler, ValueType};

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn registry() -> HostRegistry {
    let mut registry = HostRegistry::new();
    registry
        .register_function(NativeFunction::new(
            "random",
            HostFn(1),
            ValueType::INT,
            [ValueType::INT],
        ))
        .unwrap();
    registry
}

/// A script with `events` trigger/event pairs, each with a few statements.
fn generate_script(events: usize) -> String {
    let mut source = String::from("public int total;\nprivate int counts[16];\n\n");
    for i in 0..events {
        source.push_str(&format!(
            "trigger t{i}(every, {});\n\
             event e{i}(t{i})\n\
             {{\n\
                 local int r;\n\
                 r = random(100);\n\
                 if (r > 50) {{ total = total + r; }}\n\
                 else if (r > 25) {{ counts[{}] = counts[{}] + 1; }}\n\
                 else {{ total = total - 1; }}\n\
                 while (r > 0) {{ r = r - 10; }}\n\
             }}\n\n",
            10 + i,
            i % 16,
            i % 16
        ));
    }
    source
}

fn bench_compile(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("compile");
    for events in [1, 10, 100, 1000] {
        let source = generate_script(events);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(events), &source, |b, source| {
            let mut compiler = ScriptCompiler::new(registry());
            let options = CompileOptions::default();
            b.iter(|| {
                let program = compiler.compile(black_box(source.as_bytes()), &options);
                end_profiling_frame();
                black_box(program)
            });
        });
    }
    group.finish();
}

fn bench_debug_info(c: &mut Criterion) {
    let source = generate_script(100);
    let options = CompileOptions::new().with_debug_info(true);
    c.bench_function("compile_with_debug_info", |b| {
        let mut compiler = ScriptCompiler::new(registry());
        b.iter(|| black_box(compiler.compile(black_box(source.as_bytes()), &options)));
    });
}

criterion_group!(benches, bench_compile, bench_debug_info);
criterion_main!(benches);
