use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, Condition};

/// 转义 LIKE 查询中的通配符
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 构造 `col LIKE '%keyword%' ESCAPE '\'` 条件，任意一列命中即可
pub fn contains_any<C: ColumnTrait>(columns: &[C], keyword: &str) -> Condition {
    let pattern = format!("%{}%", escape_like_pattern(keyword));
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(col.like(LikeExpr::new(pattern.clone()).escape('\\')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("abc"), "abc");
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
    }
}
