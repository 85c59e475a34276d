use std::fmt;

/// Pass 类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RgPassType {
    /// 使用场景材质/shader 绘制
    CustomShader,
    /// 纹理拷贝
    Copy,
    /// 没有实际 GPU 工作，只用来记录一次写入；由 builder 内部创建
    Virtual,
}

impl RgPassType {
    #[inline]
    pub fn is_virtual(self) -> bool {
        self == RgPassType::Virtual
    }
}

/// Pass 节点
#[derive(Clone)]
pub struct RgPassNode {
    pub(crate) name: String,
    pub(crate) pass_type: RgPassType,
}

impl RgPassNode {
    pub(crate) fn new(name: impl Into<String>, pass_type: RgPassType) -> Self {
        Self { name: name.into(), pass_type }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn pass_type(&self) -> RgPassType {
        self.pass_type
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.pass_type.is_virtual()
    }
}

impl fmt::Debug for RgPassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RgPass({} {:?})", self.name, self.pass_type)
    }
}
