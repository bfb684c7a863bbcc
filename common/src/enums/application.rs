use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

/// 申请人性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Gender {
    #[strum(to_string = "Male")]
    Male,
    #[strum(to_string = "Female")]
    Female,
}

/// 是/否 字段（婚姻状况、是否自雇）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum YesNo {
    #[strum(to_string = "Yes")]
    Yes,
    #[strum(to_string = "No")]
    No,
}

/// 教育程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Education {
    #[strum(to_string = "Graduate")]
    Graduate,
    #[serde(rename = "Not Graduate")]
    #[strum(to_string = "Not Graduate")]
    NotGraduate,
}

/// 房产所在区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum PropertyArea {
    #[strum(to_string = "Urban")]
    Urban,
    #[strum(to_string = "Semiurban")]
    Semiurban,
    #[strum(to_string = "Rural")]
    Rural,
}

macro_rules! impl_parse {
    ($ty:ty) => {
        impl $ty {
            /// 按取值字符串解析（区分大小写）
            pub fn parse(value: &str) -> Option<Self> {
                Self::iter().find(|v| v.as_ref() == value)
            }

            /// 全部合法取值
            pub fn all_values() -> Vec<&'static str> {
                Self::iter().map(|v| -> &'static str { v.into() }).collect()
            }
        }
    };
}

impl_parse!(Gender);
impl_parse!(YesNo);
impl_parse!(Education);
impl_parse!(PropertyArea);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_values() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(YesNo::parse("No"), Some(YesNo::No));
        assert_eq!(Education::parse("Not Graduate"), Some(Education::NotGraduate));
        assert_eq!(PropertyArea::parse("Semiurban"), Some(PropertyArea::Semiurban));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Gender::parse("male"), None);
        assert_eq!(PropertyArea::parse("Suburban"), None);
    }

    #[test]
    fn test_all_values() {
        let values = PropertyArea::all_values();
        println!("property_area values: {:?}", values);
        assert_eq!(values, vec!["Urban", "Semiurban", "Rural"]);
    }
}
