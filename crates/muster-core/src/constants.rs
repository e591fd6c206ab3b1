// 属性命名约定 - 调度器与测试共同依赖的稳定键名
// 点分命名空间：platform.<provider>.<field> / network.* / os.* / cpu.*

/// 通用网络地址键：由网络类探针写入，调度器的网络感知放置逻辑
/// 统一读取这个键，与具体 provider 无关
pub const ATTR_NETWORK_IP: &str = "network.ip-address";

pub const ATTR_HOSTNAME: &str = "unique.hostname";
pub const ATTR_OS_NAME: &str = "os.name";
pub const ATTR_OS_VERSION: &str = "os.version";
pub const ATTR_KERNEL_NAME: &str = "kernel.name";
pub const ATTR_KERNEL_VERSION: &str = "kernel.version";
pub const ATTR_CPU_ARCH: &str = "cpu.arch";
pub const ATTR_CPU_NUMCORES: &str = "cpu.numcores";
pub const ATTR_CPU_FREQUENCY: &str = "cpu.frequency";
pub const ATTR_MEMORY_TOTALBYTES: &str = "memory.totalbytes";

/// 生成 provider 属性键：platform.<provider>.<field>
pub fn platform_key(provider: &str, field: &str) -> String {
    format!("platform.{provider}.{field}")
}

/// 生成 provider 标签键：platform.<provider>.tag.<name>（值恒为 "true"）
pub fn platform_tag_key(provider: &str, tag: &str) -> String {
    format!("platform.{provider}.tag.{tag}")
}

/// 生成 provider 自定义属性键：platform.<provider>.attr.<name>
pub fn platform_attr_key(provider: &str, attr: &str) -> String {
    format!("platform.{provider}.attr.{attr}")
}
