#![cfg(all(loom, feature = "loom-model"))]

//! 设备上下文的 Loom 模型检查。
//!
//! # 教案式说明
//! - **意图 (Why)**：`DeviceContext` 在 `cfg(loom)` 下把内部互斥锁换成 `loom::sync::Mutex`，
//!   因此这里穷举的是生产读写路径本身的加锁顺序，而不是一把测试自建的锁。
//! - **运行方式 (How)**：`RUSTFLAGS="--cfg loom" cargo test -p msgdev-core --features loom-model --test loom_concurrency`；
//!   该配置下上下文只能在 `loom::model` 内构造，因此只运行本测试目标。
//! - **契约 (What)**：读取要么看到一条完整写入，要么什么都看不到；搬运失败不破坏缓冲，也不遗留锁。

use loom::{model, sync::Arc, thread};
use msgdev_core::{
    DeviceContext, MessageBuffer, MessageStore, ReadReturn, RingMessageBuffer,
    test_stubs::FaultingSink,
};

/// 一个线程写入 `"abc"`，另一个线程读取 3 字节；两者结束后主线程读空剩余内容。
fn write_read_interleavings<S>(make: fn() -> S)
where
    S: MessageStore,
{
    model(move || {
        let ctx = Arc::new(DeviceContext::new(make(), ReadReturn::Transferred));

        let writer = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                assert_eq!(ctx.write_bytes(b"abc").accepted, 3);
            })
        };
        let reader = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let mut out = Vec::new();
                let outcome = ctx.read(3, &mut out).expect("Vec 目的端不会失败");
                assert_eq!(outcome.transferred, out.len());
                out
            })
        };

        writer.join().expect("写线程不应 panic");
        let seen = reader.join().expect("读线程不应 panic");
        assert!(seen.is_empty() || seen == b"abc", "读到撕裂数据: {seen:?}");

        let mut all = seen;
        all.extend(ctx.read_to_vec(16));
        assert_eq!(all, b"abc");
        assert!(ctx.len() < ctx.capacity());
    });
}

/// 搬运失败与并发写入交错：失败读取不消费内容，守卫在失败路径上同样释放。
fn fault_and_write_interleavings<S>(make: fn() -> S)
where
    S: MessageStore,
{
    model(move || {
        let ctx = Arc::new(DeviceContext::new(make(), ReadReturn::Transferred));

        let faulty = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let mut sink = FaultingSink::default();
                match ctx.read(2, &mut sink) {
                    // 先于写入执行时缓冲为空，不触碰目的端。
                    Ok(outcome) => {
                        assert_eq!(outcome.transferred, 0);
                        assert_eq!(sink.attempts(), 0);
                    }
                    Err(err) => {
                        assert!(err.is_transfer_fault());
                        assert_eq!(sink.attempts(), 1);
                    }
                }
            })
        };
        let writer = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                ctx.write_bytes(b"xy");
            })
        };

        faulty.join().expect("失败线程不应 panic");
        writer.join().expect("写线程不应 panic");
        assert_eq!(ctx.snapshot(), b"xy");
    });
}

#[test]
fn compacting_context_write_read_is_atomic() {
    write_read_interleavings(|| MessageBuffer::with_capacity(4).expect("容量合法"));
}

#[test]
fn ring_context_write_read_is_atomic() {
    write_read_interleavings(|| RingMessageBuffer::with_capacity(4).expect("容量合法"));
}

#[test]
fn compacting_context_fault_keeps_content() {
    fault_and_write_interleavings(|| MessageBuffer::with_capacity(4).expect("容量合法"));
}

#[test]
fn ring_context_fault_keeps_content() {
    fault_and_write_interleavings(|| RingMessageBuffer::with_capacity(4).expect("容量合法"));
}
