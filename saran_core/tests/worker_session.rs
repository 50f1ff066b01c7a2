use std::{cell::RefCell, rc::Rc, time::Duration};

use pretty_assertions::assert_eq;
use saran_core::{
    config::SuggestionConfig,
    key_event::{Action, InputEvent},
    model::{FieldId, FieldRole, Rect},
    presentation::Overlay,
    session::Session,
    vocabulary::{SharedVocabulary, Vocabulary, VocabularySource},
    worker::{FilterResponse, FilterResults, FilterWorker},
};

#[derive(Clone, Default)]
struct CountingOverlay {
    attached: Rc<RefCell<i32>>,
    rows: Rc<RefCell<Vec<String>>>,
}

impl Overlay for CountingOverlay {
    fn show(&mut self, _frame: Rect) {
        *self.attached.borrow_mut() += 1;
    }

    fn set_frame(&mut self, _frame: Rect) {}

    fn update_content(&mut self, candidates: &[String], _highlight: Option<usize>) {
        *self.rows.borrow_mut() = candidates.to_vec();
    }

    fn hide(&mut self) {
        *self.attached.borrow_mut() -= 1;
    }
}

struct Roles {
    names: SharedVocabulary,
    addresses: SharedVocabulary,
}

impl VocabularySource for Roles {
    fn vocabulary(&self, role: FieldRole) -> Vocabulary {
        match role {
            FieldRole::Alamat => self.addresses.snapshot(),
            _ => self.names.snapshot(),
        }
    }
}

fn roles() -> Roles {
    Roles {
        names: SharedVocabulary::new(vec!["Siti".into(), "Sinta".into(), "Budi".into()]),
        addresses: SharedVocabulary::new(vec!["Jl. Merdeka".into(), "Merdeka".into(), "Medan".into()]),
    }
}

const ANCHOR: Rect = Rect::new(40.0, 80.0, 220.0, 22.0);

fn dispatch(worker: &FilterWorker, actions: Vec<Action>) -> usize {
    let mut n = 0;
    for action in actions {
        if let Action::Filter(req) = action {
            worker.submit(req);
            n += 1;
        }
    }
    n
}

/// 收结果直到有一个被采用。
fn pump_until_accepted(
    session: &mut Session<CountingOverlay, Roles>,
    rx: &mut FilterResults,
) -> FilterResponse {
    loop {
        let response = rx.blocking_recv().expect("worker alive");
        if session.deliver(response.clone()) {
            return response;
        }
    }
}

#[test]
fn worker_results_drive_overlay() {
    let (worker, mut rx) = FilterWorker::spawn().unwrap();
    let overlay = CountingOverlay::default();
    let mut session = Session::new(overlay.clone(), roles(), SuggestionConfig::default());

    session.handle(InputEvent::EditingStarted {
        field: FieldId(1),
        role: FieldRole::NamaSiswa,
        anchor: ANCHOR,
    });
    let out = session.handle(InputEvent::TextChanged("si".into()));
    assert_eq!(dispatch(&worker, out.actions), 1);
    pump_until_accepted(&mut session, &mut rx);

    assert!(session.is_visible());
    assert_eq!(*overlay.rows.borrow(), ["Siti", "Sinta"]);
    assert_eq!(*overlay.attached.borrow(), 1);
}

#[test]
fn only_latest_keystroke_updates_overlay() {
    let (worker, mut rx) = FilterWorker::spawn().unwrap();
    let overlay = CountingOverlay::default();
    let config = SuggestionConfig {
        debounce_ms: 20,
        ..SuggestionConfig::default()
    };
    let mut session = Session::new(overlay.clone(), roles(), config);

    session.handle(InputEvent::EditingStarted {
        field: FieldId(1),
        role: FieldRole::Alamat,
        anchor: ANCHOR,
    });
    for text in ["m", "me", "mer"] {
        let out = session.handle(InputEvent::TextChanged(text.into()));
        dispatch(&worker, out.actions);
    }
    let accepted = pump_until_accepted(&mut session, &mut rx);
    assert_eq!(accepted.candidates, ["Merdeka"]);
    assert_eq!(session.snapshot().candidates, ["Merdeka"]);
}

#[test]
fn rebinding_discards_in_flight_result() {
    let (worker, mut rx) = FilterWorker::spawn().unwrap();
    let overlay = CountingOverlay::default();
    let config = SuggestionConfig {
        debounce_ms: 30,
        ..SuggestionConfig::default()
    };
    let mut session = Session::new(overlay.clone(), roles(), config);

    session.handle(InputEvent::EditingStarted {
        field: FieldId(1),
        role: FieldRole::Alamat,
        anchor: ANCHOR,
    });
    let out = session.handle(InputEvent::TextChanged("me".into()));
    dispatch(&worker, out.actions);

    session.handle(InputEvent::EditingStarted {
        field: FieldId(2),
        role: FieldRole::NamaGuru,
        anchor: ANCHOR,
    });

    // 旧请求在 debounce 期间被取消，不会产生结果
    std::thread::sleep(Duration::from_millis(80));
    assert!(rx.try_recv().is_err());
    assert!(!session.is_visible());
    assert_eq!(*overlay.attached.borrow(), 0);

    let out = session.handle(InputEvent::TextChanged("bu".into()));
    dispatch(&worker, out.actions);
    let accepted = pump_until_accepted(&mut session, &mut rx);
    assert_eq!(accepted.field, FieldId(2));
    assert_eq!(*overlay.rows.borrow(), ["Budi"]);
}

#[test]
fn replaced_vocabulary_applies_to_next_binding() {
    let (worker, mut rx) = FilterWorker::spawn().unwrap();
    let overlay = CountingOverlay::default();
    let mut session = Session::new(overlay.clone(), roles(), SuggestionConfig::default());

    session
        .source()
        .names
        .replace(vec!["Bagas".into(), "Bayu".into()]);
    session.handle(InputEvent::EditingStarted {
        field: FieldId(3),
        role: FieldRole::NamaGuru,
        anchor: ANCHOR,
    });
    let out = session.handle(InputEvent::TextChanged("ba".into()));
    dispatch(&worker, out.actions);
    pump_until_accepted(&mut session, &mut rx);
    assert_eq!(session.snapshot().candidates, ["Bayu", "Bagas"]);
}
