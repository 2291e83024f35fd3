/// 解码线程与渲染线程共享的状态
pub mod context;

/// 触摸事件模型: 事件类型, slot 表和协议状态机
pub mod event_model;

/// 原始输入接口实现 (evdev)
pub mod input_devices;

/// 屏幕叠加层: 圆形光栅化, 合成, 双缓冲渲染和显示后端
pub mod screen_overlay;

/// 配置文件
pub mod config;

// 整体流程:
// 主线程跑 `EventDecoder::run`, 读 evdev 事件, 改写 `SlotTable`,
// 每个 SYN_REPORT (以及手指抬起) 唤醒渲染线程
// 渲染线程把当前 slot 表拷贝出来, 在后台 buffer 上画圆, 提交后交换前后台

// 唤醒信号不计数: 渲染线程醒来之前来的多个 SYN_REPORT 只会合成一帧
// 50ms 的帧间隔就是靠这个合并掉的

// 每个 slot 固定一种颜色, slot 号会被不同的手指复用, 所以颜色只代表 slot 不代表手指
