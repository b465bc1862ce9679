// ═══════════════════════════════════════════════════════════════════
// Listener Tests — calendar, checklist, daily gate, celebration
// driven through WishlistStore notifications
// ═══════════════════════════════════════════════════════════════════

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use wishlist_savings_core::errors::CoreError;
use wishlist_savings_core::listeners::calendar::SavingsCalendar;
use wishlist_savings_core::listeners::celebration::CelebrationTracker;
use wishlist_savings_core::listeners::checklist::SavingsChecklist;
use wishlist_savings_core::listeners::daily::DailySavingGate;
use wishlist_savings_core::listeners::{NotificationContext, WishlistListener};
use wishlist_savings_core::models::notification::Notification;
use wishlist_savings_core::models::savings_log::{CalendarDay, SavingsLogEntry};
use wishlist_savings_core::models::settings::Settings;
use wishlist_savings_core::models::wishlist::NewWishlist;
use wishlist_savings_core::services::clock::FixedClock;
use wishlist_savings_core::storage::keys;
use wishlist_savings_core::storage::manager::StorageManager;
use wishlist_savings_core::storage::memory::MemoryStorage;
use wishlist_savings_core::storage::traits::KeyValueStorage;
use wishlist_savings_core::WishlistStore;

const SEED: &str = "default-wishlist";

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn clock() -> FixedClock {
    FixedClock(Local.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap())
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open_store() -> WishlistStore<MemoryStorage> {
    let _ = env_logger::builder().is_test(true).try_init();
    WishlistStore::open_with(MemoryStorage::new(), Settings::default(), clock()).unwrap()
}

fn open_over(storage: MemoryStorage) -> WishlistStore<MemoryStorage> {
    WishlistStore::open_with(storage, Settings::default(), clock()).unwrap()
}

fn attach<L: WishlistListener + 'static>(
    store: &mut WishlistStore<MemoryStorage>,
    listener: L,
) -> Rc<RefCell<L>> {
    let shared = Rc::new(RefCell::new(listener));
    store.subscribe(shared.clone()).unwrap();
    shared
}

/// Adds a second wishlist and selects the seed again.
fn with_bike(store: &mut WishlistStore<MemoryStorage>) -> String {
    let bike = store
        .add(NewWishlist::new("Sepeda", 2_000_000, "bike.png"))
        .unwrap();
    store.select(SEED).unwrap();
    bike
}

fn stored_days(store: &WishlistStore<MemoryStorage>, id: &str) -> Vec<CalendarDay> {
    StorageManager::read_json(store.storage(), &keys::calendar(id))
        .unwrap()
        .unwrap_or_default()
}

fn stored_entries(store: &WishlistStore<MemoryStorage>, id: &str) -> Vec<SavingsLogEntry> {
    StorageManager::read_json(store.storage(), &keys::checklist(id))
        .unwrap()
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════
// SavingsCalendar
// ═══════════════════════════════════════════════════════════════════

mod calendar {
    use super::*;

    #[test]
    fn binds_to_current_on_subscribe() {
        let mut store = open_store();
        let cal = attach(&mut store, SavingsCalendar::new());
        assert_eq!(cal.borrow().wishlist_id(), Some(SEED));
        assert!(cal.borrow().days().is_empty());
    }

    #[test]
    fn same_day_deposits_merge() {
        let mut store = open_store();
        let cal = attach(&mut store, SavingsCalendar::new());

        store.add_savings(SEED, 100_000).unwrap();
        store.add_savings(SEED, 250_000).unwrap();

        let cal = cal.borrow();
        assert_eq!(cal.days().len(), 1);
        assert_eq!(cal.amount_on(today()), 350_000);
        assert!(cal.has_savings(today()));
        assert_eq!(stored_days(&store, SEED), cal.days().to_vec());
    }

    #[test]
    fn new_day_is_inserted_in_date_order() {
        let mut storage = MemoryStorage::new();
        let existing = vec![
            CalendarDay::new(date(2025, 1, 10), 10),
            CalendarDay::new(date(2025, 1, 20), 20),
        ];
        StorageManager::write_json(&mut storage, &keys::calendar(SEED), &existing).unwrap();
        let mut store = open_over(storage);
        let cal = attach(&mut store, SavingsCalendar::new());
        assert_eq!(cal.borrow().days().len(), 2);

        store.add_savings(SEED, 15).unwrap();

        let days: Vec<u32> = cal.borrow().days().iter().map(|d| d.day).collect();
        assert_eq!(days, vec![10, 15, 20]);
        assert_eq!(cal.borrow().total(), 45);
    }

    #[test]
    fn month_queries_are_one_based() {
        let mut storage = MemoryStorage::new();
        let existing = vec![
            CalendarDay::new(date(2024, 12, 31), 5),
            CalendarDay::new(date(2025, 1, 2), 7),
        ];
        StorageManager::write_json(&mut storage, &keys::calendar(SEED), &existing).unwrap();
        let mut store = open_over(storage);
        let cal = attach(&mut store, SavingsCalendar::new());
        store.add_savings(SEED, 3).unwrap();

        let cal = cal.borrow();
        assert_eq!(cal.month_entries(2025, 1).len(), 2);
        assert_eq!(cal.month_total(2025, 1), 10);
        assert_eq!(cal.month_total(2024, 12), 5);
        assert_eq!(cal.month_total(2025, 2), 0);
    }

    #[test]
    fn reset_savings_clears_log() {
        let mut store = open_store();
        let cal = attach(&mut store, SavingsCalendar::new());
        store.add_savings(SEED, 100).unwrap();

        store.reset_savings(SEED).unwrap();

        assert!(cal.borrow().days().is_empty());
        assert!(store.storage().get_item(&keys::calendar(SEED)).unwrap().is_none());
    }

    #[test]
    fn selection_swaps_logs() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let cal = attach(&mut store, SavingsCalendar::new());
        store.add_savings(SEED, 500).unwrap();

        store.select(&bike).unwrap();
        assert_eq!(cal.borrow().wishlist_id(), Some(bike.as_str()));
        assert!(cal.borrow().days().is_empty());

        store.select(SEED).unwrap();
        assert_eq!(cal.borrow().amount_on(today()), 500);
    }

    #[test]
    fn deposit_on_other_wishlist_goes_to_its_key() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let cal = attach(&mut store, SavingsCalendar::new());

        store.add_savings(&bike, 42).unwrap();

        assert!(cal.borrow().days().is_empty());
        let days = stored_days(&store, &bike);
        assert_eq!(days, vec![CalendarDay::new(today(), 42)]);
    }

    #[test]
    fn deleting_current_rebinds_to_promoted() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        store.select(&bike).unwrap();
        let cal = attach(&mut store, SavingsCalendar::new());
        store.add_savings(&bike, 9).unwrap();

        store.delete(&bike).unwrap();

        assert_eq!(cal.borrow().wishlist_id(), Some(SEED));
        assert!(cal.borrow().days().is_empty());
        assert!(stored_days(&store, &bike).is_empty());
    }

    #[test]
    fn corrupt_log_fails_subscribe() {
        let mut storage = MemoryStorage::new();
        storage.set_item(&keys::calendar(SEED), "{oops").unwrap();
        let mut store = open_over(storage);

        let err = store
            .subscribe(Rc::new(RefCell::new(SavingsCalendar::new())))
            .unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// SavingsChecklist
// ═══════════════════════════════════════════════════════════════════

mod checklist {
    use super::*;

    #[test]
    fn deposits_are_logged_newest_first() {
        let mut store = open_store();
        let list = attach(&mut store, SavingsChecklist::new());

        store.add_savings(SEED, 100).unwrap();
        store.add_savings(SEED, 200).unwrap();

        let list = list.borrow();
        let amounts: Vec<u64> = list.entries().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![200, 100]);
        assert!(list.entries().iter().all(|e| e.completed));
        assert!(list.entries().iter().all(|e| e.note == "Tabungan harian"));
        assert_eq!(list.completed_total(), 300);
        assert_eq!(stored_entries(&store, SEED), list.entries().to_vec());
    }

    #[test]
    fn manual_entry_uses_note_or_default() {
        let mut store = open_store();
        let list = attach(&mut store, SavingsChecklist::new());

        {
            let mut ctx = store.context();
            let entry = list.borrow_mut().add_entry(&mut ctx, 5_000, "  Sisa gaji ").unwrap().clone();
            assert_eq!(entry.note, "Sisa gaji");
            assert_eq!(entry.amount, 5_000);
        }
        {
            let mut ctx = store.context();
            let mut list = list.borrow_mut();
            let entry = list.add_entry(&mut ctx, 1_000, "   ").unwrap();
            assert_eq!(entry.note, "Tabungan harian");
        }

        assert_eq!(stored_entries(&store, SEED).len(), 2);
        // Manual entries never move the authoritative total
        assert_eq!(store.get_current().unwrap().saved, 2_500_000);
    }

    #[test]
    fn manual_entry_rejects_non_positive() {
        let mut store = open_store();
        let list = attach(&mut store, SavingsChecklist::new());
        let mut ctx = store.context();

        for amount in [0, -50] {
            let err = list.borrow_mut().add_entry(&mut ctx, amount, "x").unwrap_err();
            assert!(matches!(err, CoreError::InvalidAmount(a) if a == amount));
        }
        assert!(list.borrow().entries().is_empty());
    }

    #[test]
    fn unbound_checklist_refuses_entries() {
        let mut store = open_store();
        let mut list = SavingsChecklist::new();
        let mut ctx = store.context();
        assert!(matches!(
            list.add_entry(&mut ctx, 10, "x"),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn toggle_flips_and_persists() {
        let mut store = open_store();
        let list = attach(&mut store, SavingsChecklist::new());
        store.add_savings(SEED, 700).unwrap();
        let entry_id = list.borrow().entries()[0].id;

        {
            let mut ctx = store.context();
            assert!(list.borrow_mut().toggle_completed(&mut ctx, entry_id).unwrap());
            assert!(!list.borrow_mut().toggle_completed(&mut ctx, Uuid::new_v4()).unwrap());
        }

        assert_eq!(list.borrow().completed_total(), 0);
        assert!(!stored_entries(&store, SEED)[0].completed);
    }

    #[test]
    fn reload_on_selection() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let list = attach(&mut store, SavingsChecklist::new());
        store.add_savings(SEED, 1).unwrap();
        store.add_savings(&bike, 2).unwrap();
        assert_eq!(list.borrow().entries().len(), 1);

        store.select(&bike).unwrap();
        assert_eq!(list.borrow().wishlist_id(), Some(bike.as_str()));
        assert_eq!(list.borrow().entries()[0].amount, 2);
    }

    #[test]
    fn reset_clears_history() {
        let mut store = open_store();
        let list = attach(&mut store, SavingsChecklist::new());
        store.add_savings(SEED, 1).unwrap();

        store.reset_savings(SEED).unwrap();
        assert!(list.borrow().entries().is_empty());
        assert!(stored_entries(&store, SEED).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// DailySavingGate
// ═══════════════════════════════════════════════════════════════════

mod daily_gate {
    use super::*;

    #[test]
    fn open_until_first_deposit() {
        let mut store = open_store();
        let gate = attach(&mut store, DailySavingGate::new());
        assert!(gate.borrow().can_save_today());
        assert_eq!(gate.borrow().checked_on(), Some(today()));

        store.add_savings(SEED, 10).unwrap();

        assert!(gate.borrow().saved_today());
        assert!(!gate.borrow().can_save_today());
        assert_eq!(
            store
                .storage()
                .get_item(&keys::daily_saving(SEED, today()))
                .unwrap()
                .as_deref(),
            Some("true")
        );
    }

    #[test]
    fn flag_follows_selection() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let gate = attach(&mut store, DailySavingGate::new());
        store.add_savings(SEED, 10).unwrap();

        store.select(&bike).unwrap();
        assert!(!gate.borrow().saved_today());

        store.select(SEED).unwrap();
        assert!(gate.borrow().saved_today());
    }

    #[test]
    fn deposit_on_other_wishlist_leaves_gate_open() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let gate = attach(&mut store, DailySavingGate::new());

        store.add_savings(&bike, 10).unwrap();

        assert!(gate.borrow().can_save_today());
        assert!(store
            .storage()
            .contains_key(&keys::daily_saving(&bike, today()))
            .unwrap());
    }

    #[test]
    fn reset_reopens_gate() {
        let mut store = open_store();
        let gate = attach(&mut store, DailySavingGate::new());
        store.add_savings(SEED, 10).unwrap();

        store.reset_savings(SEED).unwrap();
        assert!(gate.borrow().can_save_today());
    }

    #[test]
    fn gate_reopens_on_a_new_day() {
        let mut store = open_store();
        let gate = attach(&mut store, DailySavingGate::new());
        store.add_savings(SEED, 10).unwrap();
        assert!(gate.borrow().saved_today());

        let next_day = FixedClock(Local.with_ymd_and_hms(2025, 1, 16, 8, 0, 0).unwrap());
        let mut tomorrow =
            WishlistStore::open_with(store.into_storage(), Settings::default(), next_day).unwrap();
        let ctx = tomorrow.context();

        assert!(gate.borrow().is_stale(ctx.today));
        assert!(gate.borrow_mut().refresh_if_stale(&ctx).unwrap());
        assert!(gate.borrow().can_save_today());
        assert_eq!(gate.borrow().checked_on(), Some(date(2025, 1, 16)));
        assert!(!gate.borrow_mut().refresh_if_stale(&ctx).unwrap());
    }

    #[test]
    fn deposit_elsewhere_after_midnight_rederives_first() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let gate = attach(&mut store, DailySavingGate::new());
        store.add_savings(SEED, 10).unwrap();
        assert!(gate.borrow().saved_today());

        let seed = store.get(SEED).unwrap().clone();
        let bike = store.get(&bike).unwrap().clone();
        let settings = Settings::default();
        let mut storage = store.into_storage();
        let next_day = date(2025, 1, 16);
        let mut ctx = NotificationContext {
            storage: &mut storage,
            current: Some(&seed),
            subject: Some(&bike),
            settings: &settings,
            now: Utc.with_ymd_and_hms(2025, 1, 16, 1, 0, 0).unwrap(),
            today: next_day,
        };

        gate.borrow_mut()
            .on_notification(&Notification::deposit(next_day, 5), &mut ctx)
            .unwrap();

        assert!(gate.borrow().can_save_today());
        assert_eq!(gate.borrow().checked_on(), Some(next_day));
        assert!(storage
            .contains_key(&keys::daily_saving(&bike.id, next_day))
            .unwrap());
    }

    #[test]
    fn flag_survives_reopen() {
        let mut store = open_store();
        attach(&mut store, DailySavingGate::new());
        store.add_savings(SEED, 10).unwrap();

        let mut reopened = open_over(store.into_storage());
        let gate = attach(&mut reopened, DailySavingGate::new());
        assert!(gate.borrow().saved_today());
    }
}

// ═══════════════════════════════════════════════════════════════════
// CelebrationTracker
// ═══════════════════════════════════════════════════════════════════

mod celebration {
    use super::*;

    #[test]
    fn fires_once_when_target_reached() {
        let mut store = open_store();
        let party = attach(&mut store, CelebrationTracker::new());

        store.add_savings(SEED, 3_000_000).unwrap();
        assert!(party.borrow().pending().is_none());

        store.add_savings(SEED, 4_500_000).unwrap();
        assert_eq!(party.borrow_mut().take_pending().as_deref(), Some(SEED));
        assert!(party.borrow().pending().is_none());

        store.add_savings(SEED, 1).unwrap();
        assert!(party.borrow().pending().is_none());
    }

    #[test]
    fn reset_rearms() {
        let mut store = open_store();
        let party = attach(&mut store, CelebrationTracker::new());
        store.add_savings(SEED, 7_500_000).unwrap();
        assert!(party.borrow_mut().take_pending().is_some());

        store.reset_savings(SEED).unwrap();
        assert!(store.storage().get_item(&keys::celebration(SEED)).unwrap().is_none());

        store.add_savings(SEED, 10_000_000).unwrap();
        assert_eq!(party.borrow().pending(), Some(SEED));
    }

    #[test]
    fn selection_drops_pending() {
        let mut store = open_store();
        let bike = with_bike(&mut store);
        let party = attach(&mut store, CelebrationTracker::new());
        store.add_savings(SEED, 7_500_000).unwrap();
        assert!(party.borrow().pending().is_some());

        store.select(&bike).unwrap();
        assert!(party.borrow().pending().is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// All listeners together
// ═══════════════════════════════════════════════════════════════════

mod together {
    use super::*;

    #[test]
    fn one_deposit_updates_every_view() {
        let mut store = open_store();
        let cal = attach(&mut store, SavingsCalendar::new());
        let list = attach(&mut store, SavingsChecklist::new());
        let gate = attach(&mut store, DailySavingGate::new());
        let party = attach(&mut store, CelebrationTracker::new());

        store.add_savings(SEED, 7_500_000).unwrap();

        assert_eq!(cal.borrow().amount_on(today()), 7_500_000);
        assert_eq!(list.borrow().entries().len(), 1);
        assert!(gate.borrow().saved_today());
        assert_eq!(party.borrow().pending(), Some(SEED));
        assert!(store.get_current().unwrap().completed);
    }

    #[test]
    fn notification_date_matches_calendar_day() {
        let n = Notification::deposit(today(), 1);
        assert_eq!(n.deposit_date(), Some(today()));
        assert!(CalendarDay::new(today(), 1).is_on(n.deposit_date().unwrap()));
    }
}
