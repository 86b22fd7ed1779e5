//! End-to-end properties of a daily recomputation.
//!
//! Each test builds a small catalog and location pool, runs the rules and
//! simulation engines through [`recompute`], and checks one of the
//! reproducibility or pipeline guarantees.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use sightings_core::calendar::{CalendarState, DebugOverrides, HolidayOverride, period_ramp};
use sightings_core::config::{EngineConfig, TimePeriod};
use sightings_core::monster::{Monster, MonsterCatalog};
use sightings_core::rules::RulesEngine;
use sightings_sim::{
    ChaChaStreams, ScriptedStreams, SightingReport, SimulationInputs, StreamFactory, recompute,
};
use sightings_types::{BreakdownStep, EventTag, Likelihood, LocationEntry, LocationId, MonsterId};
use sightings_world::LocationPool;

const CATALOG: &str = r"
monsters:
  - id: werewolf
    name: Werewolf
    base_probability: 0.3
    active_seasons: [Fall, Winter]
    active_time: [Night, Midnight]
    restrictions:
      requires_full_moon: true
    bonuses: [fullMoon, midnight]
    penalties: [daylight]
    habitats: [denseForest]
  - id: nessie
    name: Loch Ness Monster
    base_probability: 0.2
    habitats: [lakes]
  - id: bigfoot
    name: Bigfoot
    base_probability: 0.15
    active_seasons: [Summer, Fall]
    bonuses: [dusk, dawn]
    penalties: [winter]
    habitats: [denseForest, mountains]
  - id: mothman
    name: Mothman
    base_probability: 0.1
    active_time: [Night]
    bonuses: [dark, night]
    habitats: [P]
";

struct Fixture {
    config: EngineConfig,
    monsters: Vec<Monster>,
    pool: LocationPool,
}

impl Fixture {
    fn new() -> Self {
        let config = EngineConfig::default();
        let validated = MonsterCatalog::parse_yaml(CATALOG).unwrap().validate(&config);
        assert!(validated.warnings.is_empty(), "{:?}", validated.warnings);
        Self {
            config,
            monsters: validated.monsters,
            pool: sample_pool(),
        }
    }

    fn inputs(&self) -> SimulationInputs<'_> {
        SimulationInputs {
            pool: &self.pool,
            habitat_groups: &self.config.habitat_groups,
            config: &self.config.simulation,
        }
    }

    fn calendar(&self, date: &str, time: &str, overrides: DebugOverrides) -> CalendarState {
        CalendarState::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            overrides,
            &self.config.calendar,
        )
    }

    fn run<F: StreamFactory>(
        &self,
        monsters: &[Monster],
        disabled: &BTreeSet<MonsterId>,
        calendar: &CalendarState,
        streams: &F,
    ) -> SightingReport {
        let rules = RulesEngine::new(&self.config);
        recompute(monsters, disabled, calendar, &rules, self.inputs(), streams)
    }
}

fn location(id: &str, class: &str, code: &str, lat: f64, lon: f64) -> LocationEntry {
    LocationEntry {
        id: LocationId::new(id),
        name: format!("Location {id}"),
        latitude: lat,
        longitude: lon,
        feature_class: class.to_owned(),
        feature_code: code.to_owned(),
        country_code: "US".to_owned(),
        admin1: String::new(),
        admin2: String::new(),
    }
}

fn sample_pool() -> LocationPool {
    LocationPool::from_entries(vec![
        location("f1", "V", "FRST", 45.5, -122.6),
        location("f2", "V", "FRSTF", 47.6, -121.1),
        location("l1", "H", "LK", 57.3, -4.4),
        location("l2", "H", "RSV", 44.5, -73.2),
        location("m1", "T", "MT", 46.8, -121.7),
        location("p1", "P", "PPL", 38.8, -82.1),
        location("p2", "P", "PPLA", 39.9, -82.9),
    ])
    .unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn no_disabled() -> BTreeSet<MonsterId> {
    BTreeSet::new()
}

#[test]
fn recomputation_is_byte_identical() {
    let fixture = Fixture::new();
    let calendar = fixture.calendar("2024-09-14", "20:15", DebugOverrides::default());

    let first = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    let second = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn seed_ignores_wall_clock() {
    let fixture = Fixture::new();
    let morning = fixture.calendar("2024-09-14", "07:00", DebugOverrides::default());
    let evening = fixture.calendar("2024-09-14", "23:00", DebugOverrides::default());

    let a = fixture.run(&fixture.monsters, &no_disabled(), &morning, &ChaChaStreams);
    let b = fixture.run(&fixture.monsters, &no_disabled(), &evening, &ChaChaStreams);
    assert_eq!(a.seed, "2024-09-14");
    assert_eq!(a.seed, b.seed);
}

#[test]
fn monsters_do_not_share_streams() {
    let fixture = Fixture::new();
    let calendar = fixture.calendar("2024-09-14", "20:15", DebugOverrides::default());

    let batch = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);

    let nessie: Vec<Monster> = fixture
        .monsters
        .iter()
        .filter(|monster| monster.id.as_str() == "nessie")
        .cloned()
        .collect();
    let alone = fixture.run(&nessie, &no_disabled(), &calendar, &ChaChaStreams);

    let id = MonsterId::new("nessie");
    assert_eq!(batch.record(&id), alone.record(&id));
}

#[test]
fn disabling_one_monster_leaves_others_unchanged() {
    let fixture = Fixture::new();
    let calendar = fixture.calendar("2024-09-14", "20:15", DebugOverrides::default());

    let all = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    let disabled: BTreeSet<MonsterId> = [MonsterId::new("werewolf"), MonsterId::new("bigfoot")]
        .into_iter()
        .collect();
    let some = fixture.run(&fixture.monsters, &disabled, &calendar, &ChaChaStreams);

    assert_eq!(some.records.len(), 2);
    assert!(some.record(&MonsterId::new("werewolf")).is_none());
    for record in &some.records {
        assert_eq!(all.record(&record.monster_id), Some(record));
    }
}

#[test]
fn records_follow_catalog_order() {
    let fixture = Fixture::new();
    let calendar = fixture.calendar("2024-09-14", "20:15", DebugOverrides::default());
    let report = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    let ids: Vec<&str> = report
        .records
        .iter()
        .map(|record| record.monster_id.as_str())
        .collect();
    assert_eq!(ids, ["werewolf", "nessie", "bigfoot", "mothman"]);
}

#[test]
fn unmet_restriction_consumes_no_draws() {
    let fixture = Fixture::new();
    let overrides = DebugOverrides {
        full_moon: Some(false),
        ..DebugOverrides::default()
    };
    let calendar = fixture.calendar("2024-09-14", "23:30", overrides);
    let werewolf: Vec<Monster> = fixture.monsters.iter().take(1).cloned().collect();
    let streams = ScriptedStreams::constant(0.0);

    let report = fixture.run(&werewolf, &no_disabled(), &calendar, &streams);
    let record = report.records.first().unwrap();

    assert!(record.probability.abs() < f64::EPSILON);
    assert_eq!(record.count, 0);
    assert_eq!(record.likelihood, Likelihood::Impossible);
    assert_eq!(
        record.breakdown.steps(),
        [BreakdownStep::Impossible {
            reason: "Requires Full Moon".to_owned()
        }]
    );
    assert_eq!(streams.draws(), 0);
}

#[test]
fn halloween_overrides_every_modifier() {
    let fixture = Fixture::new();
    for time in ["03:30", "12:00", "19:45", "23:59"] {
        for multiplier in [None, Some(0.5), Some(3.0)] {
            let overrides = DebugOverrides {
                full_moon: Some(false),
                probability_multiplier: multiplier,
                ..DebugOverrides::default()
            };
            let calendar = fixture.calendar("2024-10-31", time, overrides);
            let report = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);

            for (monster, record) in fixture.monsters.iter().zip(&report.records) {
                let expected =
                    (monster.base_probability * 2.5 * multiplier.unwrap_or(1.0)).clamp(0.0, 1.0);
                assert!(approx(record.probability, expected), "{} at {time}", monster.id);
                assert_eq!(record.event, Some(EventTag::Halloween));
                assert!(record.breakdown.steps().iter().all(|step| matches!(
                    step,
                    BreakdownStep::Final { .. } | BreakdownStep::Multiplier { .. }
                )));
            }
        }
    }
}

#[test]
fn forced_holiday_overrides_calendar_date() {
    let fixture = Fixture::new();
    let overrides = DebugOverrides {
        holiday: Some(HolidayOverride::Ordinary),
        ..DebugOverrides::default()
    };
    let calendar = fixture.calendar("2024-10-31", "12:00", overrides);
    let report = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    assert!(report.records.iter().all(|record| record.event.is_none()));

    let overrides = DebugOverrides {
        holiday: Some(HolidayOverride::Halloween),
        ..DebugOverrides::default()
    };
    let calendar = fixture.calendar("2024-03-01", "12:00", overrides);
    let report = fixture.run(&fixture.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    assert!(
        report
            .records
            .iter()
            .all(|record| record.event == Some(EventTag::Halloween))
    );
}

#[test]
fn probabilities_always_clamped() {
    let fixture = Fixture::new();
    let mut greedy = Monster::new("greedy", 0.95);
    greedy.bonuses = fixture
        .monsters
        .iter()
        .flat_map(|monster| monster.bonuses.iter().copied())
        .collect();
    let mut starved = Monster::new("starved", 0.01);
    starved.penalties = fixture
        .monsters
        .iter()
        .flat_map(|monster| monster.penalties.iter().copied())
        .collect();
    let monsters = vec![greedy, starved];

    let moments = [
        ("2024-01-25", "00:30"),
        ("2024-07-04", "12:00"),
        ("2024-10-31", "03:00"),
    ];
    for (date, time) in moments {
        for multiplier in [Some(-2.0), None, Some(10.0)] {
            let overrides = DebugOverrides {
                probability_multiplier: multiplier,
                ..DebugOverrides::default()
            };
            let calendar = fixture.calendar(date, time, overrides);
            let report = fixture.run(&monsters, &no_disabled(), &calendar, &ChaChaStreams);
            for record in &report.records {
                assert!((0.0..=1.0).contains(&record.probability));
                assert!(matches!(
                    record.breakdown.steps().first(),
                    Some(BreakdownStep::Final { value }) if approx(*value, record.probability)
                ));
            }
        }
    }
}

#[test]
fn night_ramp_boundaries() {
    let night = TimePeriod::new("Night", 1260, 1350, 1439, 2.2);
    assert!(approx(period_ramp(&night, 1260).unwrap(), 1.0));
    assert!(approx(period_ramp(&night, 1350).unwrap(), 2.2));
    assert!(approx(period_ramp(&night, 1439).unwrap(), 1.0));
    assert!(period_ramp(&night, 1259).is_none());
}

#[test]
fn likelihood_bands() {
    let expected = [
        (0, Likelihood::VeryLow),
        (1, Likelihood::Low),
        (2, Likelihood::Low),
        (3, Likelihood::Medium),
        (5, Likelihood::Medium),
        (6, Likelihood::High),
        (40, Likelihood::High),
    ];
    for (count, band) in expected {
        assert_eq!(Likelihood::from_count(count), band);
    }
}

#[test]
fn halloween_scenario() {
    let fixture = Fixture::new();
    let monster = Monster::new("phantom", 0.1);
    let calendar = fixture.calendar("2024-10-31", "12:00", DebugOverrides::default());
    let report = fixture.run(&[monster], &no_disabled(), &calendar, &ChaChaStreams);
    let record = report.records.first().unwrap();

    assert!(approx(record.probability, 0.25));
    let json = serde_json::to_value(&record.breakdown).unwrap();
    let steps = json.as_array().unwrap();
    assert_eq!(steps.len(), 2);
    let final_step = steps.first().unwrap();
    assert_eq!(final_step["type"], "final");
    assert!(approx(final_step["value"].as_f64().unwrap(), 0.25));
    let multiplier = steps.get(1).unwrap();
    assert_eq!(multiplier["type"], "multiplier");
    assert_eq!(multiplier["label"], "Global Multiplier");
    assert!(approx(multiplier["value"].as_f64().unwrap(), 2.5));
}

#[test]
fn midsummer_scenario() {
    let fixture = Fixture::new();
    let catalog = MonsterCatalog::parse_yaml(
        r"
monsters:
  - id: fae
    name: Fair Folk
    base_probability: 0.05
    bonuses: [midsummer]
    habitats: [denseForest]
",
    )
    .unwrap()
    .validate(&fixture.config);
    let calendar = fixture.calendar("2024-06-21", "12:00", DebugOverrides::default());
    let report = fixture.run(&catalog.monsters, &no_disabled(), &calendar, &ChaChaStreams);
    let record = report.records.first().unwrap();

    assert!(approx(record.probability, 0.30));
    assert_eq!(record.event, None);
    assert!(record.breakdown.steps().contains(&BreakdownStep::Bonus {
        label: "Midsummer".to_owned(),
        value: 0.25,
    }));
}

#[test]
fn placements_come_from_habitat_and_stay_near_source() {
    let fixture = Fixture::new();
    let mut lurker = Monster::new("lurker", 1.0);
    lurker.habitats = vec!["lakes".to_owned()];
    let calendar = fixture.calendar("2024-04-02", "12:00", DebugOverrides::default());
    let report = fixture.run(&[lurker], &no_disabled(), &calendar, &ChaChaStreams);
    let record = report.records.first().unwrap();

    assert_eq!(record.count, 40);
    assert_eq!(record.locations.len(), 40);
    for sighting in &record.locations {
        let source = fixture
            .pool
            .entries()
            .iter()
            .find(|entry| entry.id == sighting.location_id)
            .unwrap();
        assert_eq!(source.feature_class, "H");
        assert!((sighting.latitude - source.latitude).abs() <= 0.01 + 1e-9);
        assert!((sighting.longitude - source.longitude).abs() <= 0.01 + 1e-9);
    }
}

#[test]
fn empty_habitat_pool_is_reported() {
    let fixture = Fixture::new();
    let mut lost = Monster::new("lost", 1.0);
    lost.habitats = vec!["coast".to_owned()];
    let calendar = fixture.calendar("2024-04-02", "12:00", DebugOverrides::default());
    let report = fixture.run(&[lost], &no_disabled(), &calendar, &ChaChaStreams);

    assert_eq!(report.total_sightings(), 40);
    let issues: Vec<_> = report.issues().collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().unwrap().0.as_str(), "lost");
}
