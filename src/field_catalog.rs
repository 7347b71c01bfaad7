use crate::models::Field;
use std::collections::{HashMap, HashSet};

/// 小文字化した表示名からフィールドIDへの対応表
///
/// 実行開始時に1度だけ構築し、以降は読み取り専用で共有する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    entries: HashMap<String, String>,
}

impl FieldCatalog {
    /// フィールド定義一覧から対応表を構築する
    ///
    /// 定義は受け取った順に処理する。カスタムフィールド同士の名前衝突では
    /// 先に現れたものが残り、標準フィールドと衝突したカスタムフィールドは
    /// 順序に関係なく対応表から外れる。
    pub fn resolve(fields: &[Field]) -> Self {
        let mut entries: HashMap<String, String> = HashMap::new();
        let mut standard_names: HashSet<String> = HashSet::new();

        for field in fields {
            let name = field.name.to_lowercase();

            if field.custom {
                if !entries.contains_key(&name) && !standard_names.contains(&name) {
                    entries.insert(name, field.id.to_lowercase());
                }
            } else if entries.remove(&name).is_none() {
                standard_names.insert(name);
            }
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 要求されたフィールド名を検索用のフィールドIDに変換する
    ///
    /// カスタムフィールド名はIDに置き換え、それ以外は小文字化してそのまま使う。
    pub fn field_ids_for(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| name.to_lowercase())
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for FieldCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
                .collect(),
        }
    }
}
