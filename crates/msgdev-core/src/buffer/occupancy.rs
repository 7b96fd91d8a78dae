/// 缓冲占用状态。
///
/// # 状态与转换（What）
/// - `Empty`：`len == 0`，初始状态；
/// - `Partial`：`0 < len < usable`；
/// - `Full`：`len == usable`，此后写入只接受 0 字节。
///
/// 写入推动 `Empty → Partial → Full`，读取推动 `Full → Partial → Empty`；
/// 状态机没有终止态，在缓冲整个生命周期内循环。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Empty,
    Partial,
    Full,
}

impl Occupancy {
    /// 由当前长度与可用容量推导占用状态。
    ///
    /// `usable` 为容量减去预留位后的值；`len > usable` 违反缓冲不变量，仅在 debug 构建断言。
    pub fn classify(len: usize, usable: usize) -> Self {
        debug_assert!(len <= usable, "length {len} exceeds usable capacity {usable}");
        if len == 0 {
            Occupancy::Empty
        } else if len >= usable {
            Occupancy::Full
        } else {
            Occupancy::Partial
        }
    }
}
