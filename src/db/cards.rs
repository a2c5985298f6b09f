use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{Card, Deck};

/// Fixed-width UTC text so `ORDER BY` and `<=` on the column follow time order.
pub fn to_db_time(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_db_time(idx: usize, raw: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_card(row: &Row) -> Result<Card> {
  let next_review: String = row.get(5)?;
  Ok(Card {
    id: row.get(0)?,
    deck_id: row.get(1)?,
    front_text: row.get(2)?,
    back_text: row.get(3)?,
    interval_days: row.get(4)?,
    next_review: parse_db_time(5, &next_review)?,
  })
}

pub fn insert_deck(conn: &Connection, deck: &Deck) -> Result<i64> {
  conn.execute(
    "INSERT INTO decks (name, created_at) VALUES (?1, ?2)",
    params![deck.name, to_db_time(deck.created_at)],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn insert_card(conn: &Connection, card: &Card) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO cards (deck_id, front_text, back_text, interval_days, next_review)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
    params![
      card.deck_id,
      card.front_text,
      card.back_text,
      card.interval_days,
      to_db_time(card.next_review),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn get_card_by_id(conn: &Connection, id: i64) -> Result<Option<Card>> {
  conn
    .query_row(
      r#"
      SELECT id, deck_id, front_text, back_text, interval_days, next_review
      FROM cards WHERE id = ?1
      "#,
      params![id],
      row_to_card,
    )
    .optional()
}

/// Due cards for a deck, earliest `next_review` first.
pub fn get_due_cards(conn: &Connection, deck_id: i64, as_of: DateTime<Utc>) -> Result<Vec<Card>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, deck_id, front_text, back_text, interval_days, next_review
    FROM cards
    WHERE deck_id = ?1 AND next_review <= ?2
    ORDER BY next_review ASC, id ASC
    "#,
  )?;

  let cards = stmt
    .query_map(params![deck_id, to_db_time(as_of)], row_to_card)?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub fn get_due_count(conn: &Connection, deck_id: i64, as_of: DateTime<Utc>) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM cards WHERE deck_id = ?1 AND next_review <= ?2",
    params![deck_id, to_db_time(as_of)],
    |row| row.get(0),
  )
}

/// Earliest review time among the deck's cards that are not yet due.
pub fn get_next_review_time(conn: &Connection, deck_id: i64, as_of: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
  let raw: Option<String> = conn
    .query_row(
      r#"
      SELECT next_review FROM cards
      WHERE deck_id = ?1 AND next_review > ?2
      ORDER BY next_review ASC LIMIT 1
      "#,
      params![deck_id, to_db_time(as_of)],
      |row| row.get(0),
    )
    .optional()?;

  raw.map(|s| parse_db_time(0, &s)).transpose()
}

/// Writes only the scheduling columns. Returns the number of rows changed.
pub fn update_card_schedule(
  conn: &Connection,
  id: i64,
  interval_days: u32,
  next_review: DateTime<Utc>,
) -> Result<usize> {
  conn.execute(
    "UPDATE cards SET interval_days = ?1, next_review = ?2 WHERE id = ?3",
    params![interval_days, to_db_time(next_review), id],
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap()
  }

  fn add_card(conn: &Connection, deck_id: i64, front: &str, next_review: DateTime<Utc>) -> i64 {
    let card = Card::new(deck_id, front.to_string(), format!("{front} answer"), next_review);
    insert_card(conn, &card).unwrap()
  }

  #[test]
  fn test_insert_and_get_card() {
    let env = TestEnv::new().unwrap();
    let deck_id = env.deck("Spanish");
    let id = add_card(&env.conn, deck_id, "hola", now());

    let card = get_card_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(card.id, id);
    assert_eq!(card.deck_id, deck_id);
    assert_eq!(card.front_text, "hola");
    assert_eq!(card.back_text, "hola answer");
    assert_eq!(card.interval_days, 0);
    assert_eq!(card.next_review, now());
  }

  #[test]
  fn test_get_missing_card() {
    let env = TestEnv::new().unwrap();
    assert!(get_card_by_id(&env.conn, 999).unwrap().is_none());
  }

  #[test]
  fn test_due_cards_filtered_and_ordered() {
    let env = TestEnv::new().unwrap();
    let deck = env.deck("A");
    let other = env.deck("B");

    let late = add_card(&env.conn, deck, "late", now() - Duration::hours(1));
    let oldest = add_card(&env.conn, deck, "oldest", now() - Duration::days(10));
    let exact = add_card(&env.conn, deck, "exact", now());
    add_card(&env.conn, deck, "future", now() + Duration::seconds(1));
    add_card(&env.conn, other, "other deck", now() - Duration::days(30));

    let due = get_due_cards(&env.conn, deck, now()).unwrap();
    let ids: Vec<i64> = due.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![oldest, late, exact]);
  }

  #[test]
  fn test_due_count_and_next_review() {
    let env = TestEnv::new().unwrap();
    let deck = env.deck("A");
    add_card(&env.conn, deck, "due", now() - Duration::days(1));
    add_card(&env.conn, deck, "soon", now() + Duration::days(2));
    add_card(&env.conn, deck, "later", now() + Duration::days(9));

    assert_eq!(get_due_count(&env.conn, deck, now()).unwrap(), 1);
    assert_eq!(
      get_next_review_time(&env.conn, deck, now()).unwrap(),
      Some(now() + Duration::days(2))
    );
  }

  #[test]
  fn test_next_review_none_when_nothing_pending() {
    let env = TestEnv::new().unwrap();
    let deck = env.deck("A");
    add_card(&env.conn, deck, "due", now());
    assert_eq!(get_next_review_time(&env.conn, deck, now()).unwrap(), None);
  }

  #[test]
  fn test_update_schedule_leaves_text_alone() {
    let env = TestEnv::new().unwrap();
    let deck = env.deck("A");
    let id = add_card(&env.conn, deck, "front", now());

    let changed = update_card_schedule(&env.conn, id, 17, now() + Duration::days(17)).unwrap();
    assert_eq!(changed, 1);

    let card = get_card_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(card.interval_days, 17);
    assert_eq!(card.next_review, now() + Duration::days(17));
    assert_eq!(card.front_text, "front");
    assert_eq!(card.back_text, "front answer");
    assert_eq!(card.deck_id, deck);
  }

  #[test]
  fn test_update_missing_card_changes_nothing() {
    let env = TestEnv::new().unwrap();
    assert_eq!(update_card_schedule(&env.conn, 42, 3, now()).unwrap(), 0);
  }

  #[test]
  fn test_db_time_is_fixed_width() {
    let a = to_db_time(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let b = to_db_time(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::nanoseconds(5));
    assert_eq!(a, "2026-01-01T00:00:00.000000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
  }
}
