use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// 宿主分配给文本输入框的标识（控制器只做相等比较）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

/// 输入框的语义角色：决定加载哪一份词表。
///
/// 取值与学校档案里的字段一一对应，文本形式（`namaguru`、`alamat` 等）
/// 用于词表文件和配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// 教师姓名
    NamaGuru,
    /// 学生姓名
    NamaSiswa,
    /// 地址
    Alamat,
    /// 出生地/日期，也用于“在职年份”
    Ttl,
    /// 科目
    Mapel,
    /// 职务
    Jabatan,
}

impl FieldRole {
    pub const ALL: [FieldRole; 6] = [
        FieldRole::NamaGuru,
        FieldRole::NamaSiswa,
        FieldRole::Alamat,
        FieldRole::Ttl,
        FieldRole::Mapel,
        FieldRole::Jabatan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::NamaGuru => "namaguru",
            FieldRole::NamaSiswa => "namasiswa",
            FieldRole::Alamat => "alamat",
            FieldRole::Ttl => "ttl",
            FieldRole::Mapel => "mapel",
            FieldRole::Jabatan => "jabatan",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知角色名。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for FieldRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FieldRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

/// 逻辑像素坐标，原点在左上角，y 向下增长。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// 屏幕矩形（输入框的位置、浮层的位置、屏幕可用区域）。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }
}

/// 控制器给宿主的“快照视图”。
///
/// 宿主只读 `Snapshot`，不直接读写控制器内部状态；便于 CLI 输出与测试断言。
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// 当前绑定的输入框
    pub field: Option<FieldId>,
    /// 输入框完整文本
    pub text: String,
    /// 正在补全的词（最后一个空白之后的部分）
    pub token: String,
    /// 当前候选列表
    pub candidates: Vec<String>,
    /// 高亮行；None 即“未选中”
    pub selection: Option<usize>,
    /// 浮层位置；None 表示隐藏
    pub frame: Option<Rect>,
}

impl Snapshot {
    pub fn is_visible(&self) -> bool {
        self.frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Alamat".parse::<FieldRole>(), Ok(FieldRole::Alamat));
        assert_eq!(" mapel ".parse::<FieldRole>(), Ok(FieldRole::Mapel));
        assert_eq!(
            "kelas".parse::<FieldRole>(),
            Err(UnknownRole("kelas".to_owned()))
        );
    }

    #[test]
    fn role_round_trips_through_display() {
        for role in FieldRole::ALL {
            assert_eq!(role.to_string().parse::<FieldRole>(), Ok(role));
        }
    }
}
