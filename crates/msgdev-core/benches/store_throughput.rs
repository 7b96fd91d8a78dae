use criterion::{Criterion, black_box};
use msgdev_core::{MessageBuffer, MessageStore, RingMessageBuffer};
use std::{env, time::Duration};

/// 对比压缩式与环形存储在“写满后小步读出”模式下的成本。
///
/// # 设计背景（Why）
/// - 压缩式存储每次读取都要搬移剩余内容，小步读取时累计成本接近 O(n²)；
///   环形存储只推进游标。基准用于确认容量放大后是否值得切换布局。
///
/// # 逻辑解析（How）
/// - 每轮迭代：写满缓冲，再以 16 字节为步长读空。
fn bench_drain_in_small_steps(c: &mut Criterion, capacity: usize) {
    let payload = vec![0x5au8; capacity];

    c.bench_function(&format!("compacting_drain_{capacity}"), |b| {
        let mut store = MessageBuffer::with_capacity(capacity).expect("容量合法");
        b.iter(|| {
            store.write_bytes(&payload);
            while !store.is_empty() {
                black_box(store.read_to_vec(16));
            }
        });
    });

    c.bench_function(&format!("ring_drain_{capacity}"), |b| {
        let mut store = RingMessageBuffer::with_capacity(capacity).expect("容量合法");
        b.iter(|| {
            store.write_bytes(&payload);
            while !store.is_empty() {
                black_box(store.read_to_vec(16));
            }
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    for capacity in [256, 4096] {
        bench_drain_in_small_steps(&mut criterion, capacity);
    }
    criterion.final_summary();
}
