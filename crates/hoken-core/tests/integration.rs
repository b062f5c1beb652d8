//! End-to-end properties of the extraction engine.

use hoken_core::card::extract::extract_dates;
use hoken_core::card::finders::{DatesFinder, DATE_ROLES};
use hoken_core::card::score::score_lines;
use hoken_core::rules::builtin::insurance_card_compiled;
use hoken_core::{Analyzer, CalendarDate, Era, Field, Page, Role};

fn dates_map(texts: &[&str]) -> hoken_core::FieldMap {
    let table = insurance_card_compiled().unwrap();
    DatesFinder.run(&table, &Page::from_texts(texts))
}

#[test]
fn scenario_birthday_single_line() {
    let map = dates_map(&["生年月日 昭和62年3月10日"]);
    assert_eq!(map.get(Field::Birthday), Some("19870310"));
}

#[test]
fn scenario_validity_range_single_line() {
    let map = dates_map(&["有効開始日令和元年1月2日有効終了日令和2年1月2日"]);
    assert_eq!(map.get(Field::ValidFrom), Some("20190102"));
    assert_eq!(map.get(Field::ValidUntil), Some("20200102"));
}

#[test]
fn scenario_issue_date_single_line() {
    let map = dates_map(&["令和元年1月1日交付"]);
    assert_eq!(map.get(Field::IssueDate), Some("20190101"));
    assert_eq!(map.get(Field::Birthday), None);
    assert_eq!(map.get(Field::ValidFrom), None);
    assert_eq!(map.get(Field::ValidUntil), None);
}

#[test]
fn scenario_last_day_sentinel_ordering() {
    let last_day = CalendarDate::new(Era::Western, 2021, 2, hoken_core::LAST_DAY).unwrap();
    let feb28 = CalendarDate::new(Era::Western, 2021, 2, 28).unwrap();
    assert_eq!(last_day.canonical(), "20210299");
    assert!(last_day.canonical() > feb28.canonical());

    let extracted = extract_dates("令和3年2月末日");
    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].canonical(), "20210299");
}

#[test]
fn scenario_claimed_lines_suppress_competitors() {
    // The birthday line and the validity-end line share the literal date
    // 平成1年2月3日. Each line is claimed by its own role, so the shared
    // literal must not leak into the other role's output.
    let map = dates_map(&["生年月日平成1年2月3日", "有効期限平成1年2月3日"]);
    assert_eq!(map.get(Field::Birthday), Some("19890203"));
    assert_eq!(map.get(Field::ValidUntil), Some("19890203"));
    assert_eq!(map.get(Field::ValidFrom), None);
    assert_eq!(map.get(Field::IssueDate), None);
}

#[test]
fn canonical_round_trip() {
    for (era, year, month, day) in [
        (Era::Showa, 62, 3, 10),
        (Era::Heisei, 1, 2, 3),
        (Era::Reiwa, 5, 12, 31),
        (Era::Western, 2021, 2, 28),
        (Era::Meiji, 40, 6, 15),
    ] {
        let date = CalendarDate::new(era, year, month, day).unwrap();
        let reparsed = CalendarDate::parse_canonical(&date.canonical()).unwrap();
        assert_eq!(reparsed.canonical(), date.canonical());
    }
}

#[test]
fn resolved_values_come_from_candidates() {
    // Whatever the disambiguator outputs must have been extractable from a
    // positively scored line of that role before suppression.
    let texts = [
        "生年月日平成1年2月3日",
        "有効開始日令和元年1月2日有効終了日令和2年1月2日",
        "令和元年1月1日交付",
        "資格取得日平成30年4月1日",
    ];
    let table = insurance_card_compiled().unwrap();
    let page = Page::from_texts(&texts);
    let map = DatesFinder.run(&table, &page);

    let fields = [
        (Role::Birthday, Field::Birthday),
        (Role::ValidFrom, Field::ValidFrom),
        (Role::ValidUntil, Field::ValidUntil),
        (Role::IssueDate, Field::IssueDate),
    ];
    for (role, field) in fields {
        let Some(value) = map.get(field) else {
            continue;
        };
        let matcher = table.matcher(role);
        let scored = score_lines(&matcher, &page, role == Role::Birthday);
        let reachable = (0..page.len()).any(|line| {
            scored.scores[line] > 0
                && extract_dates(&scored.texts[line])
                    .iter()
                    .any(|d| d.canonical() == value)
        });
        assert!(reachable, "{field} = {value} was never a candidate");
    }
}

#[test]
fn disambiguation_is_idempotent() {
    let texts = [
        "国民健康保険被保険者証",
        "記号1001番号4214102",
        "生年月日平成1年2月3日",
        "有効開始日令和元年1月2日有効終了日令和2年1月2日",
        "令和元年1月1日交付",
    ];
    let first = dates_map(&texts);
    for _ in 0..3 {
        assert_eq!(dates_map(&texts), first);
    }
}

#[test]
fn date_roles_cover_the_four_fields() {
    assert_eq!(
        DATE_ROLES,
        [
            Role::Birthday,
            Role::ValidUntil,
            Role::ValidFrom,
            Role::IssueDate
        ]
    );
}

#[test]
fn main_card_page_end_to_end() {
    let analyzer = Analyzer::main_card().unwrap();
    let page = Page::from_texts(&[
        "健康保険被保険者証",
        "記号1001番号4214102",
        "生年月日平成1年2月3日",
        "有効開始日令和元年1月2日有効終了日令和2年1月2日",
        "令和元年1月1日交付",
        "保険者番号12345678",
    ]);
    let info = analyzer.analyze(&page);
    assert_eq!(info.get(Field::InsurerNumber), Some("12345678"));
    assert_eq!(info.get(Field::Code), Some("1001"));
    assert_eq!(info.get(Field::CodeNumber), Some("4214102"));
    assert_eq!(info.get(Field::Birthday), Some("19890203"));
    assert_eq!(info.get(Field::ValidFrom), Some("20190102"));
    assert_eq!(info.get(Field::ValidUntil), Some("20200102"));
    assert_eq!(info.get(Field::IssueDate), Some("20190101"));

    let json = info.to_json(analyzer.fields());
    assert_eq!(json["Birthday"], "19890203");
    assert!(json["PercentageCategory"].is_null());
}

#[test]
fn public_aid_page_end_to_end() {
    let analyzer = Analyzer::public_aid().unwrap();
    let page = Page::from_texts(&[
        "公費負担医療受給者証",
        "公費負担者番号12345678",
        "受給者番号7654321",
        "生年月日昭和62年3月10日",
        "有効期限令和3年3月31日",
        "適用区分ウ",
    ]);
    let info = analyzer.analyze(&page);
    assert_eq!(info.get(Field::InsurerNumber), Some("12345678"));
    assert_eq!(info.get(Field::RecipientNumber), Some("7654321"));
    assert_eq!(info.get(Field::Birthday), Some("19870310"));
    assert_eq!(info.get(Field::ValidUntil), Some("20210331"));
    assert_eq!(info.get(Field::ValidFrom), None);
    assert_eq!(info.get(Field::PercentageCategory), Some("ウ"));
}

#[test]
fn degenerate_pages_resolve_to_nothing() {
    let analyzer = Analyzer::main_card().unwrap();
    assert!(analyzer.analyze(&Page::from_texts::<&str>(&[])).is_empty());

    let noise = Page::from_texts(&["", "ノイズ", "☆"]);
    let info = analyzer.analyze(&noise);
    for field in analyzer.fields() {
        assert_eq!(info.get(*field), None);
    }
}
