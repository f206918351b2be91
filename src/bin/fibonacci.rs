//! Decorated Fibonacci demo.
//!
//! ```text
//! cargo run --features demo --bin fibonacci
//! RUST_LOG=warn cargo run --features demo --bin fibonacci   # hints only
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use memokit::prelude::*;
use tracing_subscriber::EnvFilter;

type FibResult = Result<u64, PreconditionError>;

/// Logged, guarded, hinted and memoized Fibonacci with `fib(0) = fib(1) = 1`.
fn fibonacci() -> Arc<impl Callable<i64, Output = FibResult>> {
    recursive(
        "fibonacci",
        |fib, x: i64| -> FibResult {
            if x == 0 || x == 1 {
                Ok(1)
            } else {
                Ok(fib.call(x - 1)? + fib.call(x - 2)?)
            }
        },
        |body| {
            Logged::new(Precondition::new(
                Hint::new(TryMemoize::new(body)),
                |x: &i64| *x >= 0,
            ))
        },
    )
}

/// Fibonacci where each term is the sum of the previous `n` terms.
fn n_fibonacci(n: usize) -> Arc<impl Callable<i64, Output = FibResult>> {
    recursive(
        format!("fibonacci_{}", n),
        move |fib, x: i64| -> FibResult {
            if x == 0 || x == 1 {
                return Ok(1);
            }
            let mut sum = 0u64;
            for i in 1..=n as i64 {
                if x - i >= 0 {
                    sum += fib.call(x - i)?;
                }
            }
            Ok(sum)
        },
        |body| {
            Logged::new(Precondition::new(
                Hint::new(TryMemoize::new(body)),
                |x: &i64| *x >= 0,
            ))
        },
    )
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let fibonacci = NotNull::new(fibonacci());
    match fibonacci.call(Some(50)) {
        Ok(value) => println!("fibonacci(50) = {}", value),
        Err(err) => {
            eprintln!("fibonacci(50) failed: {}", err);
            return ExitCode::FAILURE;
        },
    }
    if let Err(err) = fibonacci.call(None) {
        println!("fibonacci(None) rejected: {}", err);
    }

    let factory = NotNull::new(Precondition::new(
        Function::new("n_fibonacci", |n: i64| {
            Ok::<_, PreconditionError>(n_fibonacci(n as usize))
        }),
        |n: &i64| *n >= 0,
    ));
    let tribonacci = match factory.call(Some(3)) {
        Ok(f) => f,
        Err(err) => {
            eprintln!("n_fibonacci(3) failed: {}", err);
            return ExitCode::FAILURE;
        },
    };
    match tribonacci.call(30) {
        Ok(value) => println!("fibonacci_3(30) = {}", value),
        Err(err) => {
            eprintln!("fibonacci_3(30) failed: {}", err);
            return ExitCode::FAILURE;
        },
    }

    ExitCode::SUCCESS
}
