use crate::models::Nomenclature;
use sqlx::{FromRow, PgPool};

/// 奖金表原始行 (bonus 以文本读出，后续解析)
#[derive(Debug, Clone, FromRow)]
pub struct BonusRow {
    pub id: String,
    pub text: String,
    pub bonus: Option<String>,
}

/// 查询客户的奖金SKU列表
pub async fn list_bonus_rows(pool: &PgPool, client_id: &str) -> Result<Vec<BonusRow>, sqlx::Error> {
    sqlx::query_as::<_, BonusRow>(
        r#"
        SELECT b.sku_id::text AS id,
               coalesce(b.name, '') AS text,
               b.bonus::text AS bonus
        FROM t_bonus_sku b
        WHERE b.client_id = $1::uuid
        ORDER BY b.sku_id
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}

/// 查询客户的商品名录
pub async fn list_nomenclatures(
    pool: &PgPool,
    client_id: &str,
) -> Result<Vec<Nomenclature>, sqlx::Error> {
    sqlx::query_as::<_, Nomenclature>(
        r#"
        SELECT n.id::text AS id,
               coalesce(n.name, '') AS text,
               n.nomcode
        FROM t_nomenclature n
        WHERE n.client_id = $1::uuid
        ORDER BY n.id
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}
