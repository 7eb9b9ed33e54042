//! Property-based tests for the dialogue transitions

use super::*;
use crate::models::{AccountSummary, Credential, Language, SelectionMode};
use crate::render::Callback;
use crate::state::{ConversationState, Phase};
use proptest::prelude::*;

const NOW: i64 = 1_760_000_000;

// ============================================================================
// Generators
// ============================================================================

fn arb_mode() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![Just(SelectionMode::Numeric), Just(SelectionMode::Buttons)]
}

fn arb_account() -> impl Strategy<Value = AccountSummary> {
    ("[a-zA-Z0-9]{4,12}", any::<i64>(), "(black|white|fop|iron)").prop_map(
        |(id, balance, kind)| AccountSummary {
            id,
            balance,
            credit_limit: 0,
            currency_code: 980,
            kind,
            masked_pan: vec![],
        },
    )
}

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Idle),
        Just(Phase::SelectingLanguage),
        Just(Phase::AwaitingToken),
        Just(Phase::AwaitingAccountSelection),
        arb_account().prop_map(|account| Phase::AwaitingDays { account }),
    ]
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (
        arb_phase(),
        proptest::option::of(prop_oneof![Just(Language::English), Just(Language::Ukrainian)]),
        proptest::option::of("[a-zA-Z0-9_-]{8,44}"),
        proptest::collection::vec(arb_account(), 0..5),
    )
        .prop_map(|(phase, language, token, accounts)| {
            let mut state = ConversationState {
                language,
                credential: token.map(Credential::new),
                ..Default::default()
            };
            if !accounts.is_empty() {
                state.install_catalog(accounts);
            }
            state.phase = phase;
            state
        })
}

fn ctx(mode: SelectionMode) -> DialogueContext {
    DialogueContext {
        now: NOW,
        selection_mode: mode,
        fallback_language: Language::English,
    }
}

fn awaiting_days() -> ConversationState {
    let account = AccountSummary {
        id: "A".to_string(),
        balance: 0,
        credit_limit: 0,
        currency_code: 980,
        kind: "black".to_string(),
        masked_pan: vec![],
    };
    ConversationState {
        phase: Phase::AwaitingDays { account },
        credential: Some(Credential::new("token")),
        ..Default::default()
    }
}

fn has_statement_fetch(result: &Transition) -> bool {
    result
        .effects
        .iter()
        .any(|effect| matches!(effect, Effect::FetchStatement { .. }))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Days outside 1..=31 never reach the bank
    #[test]
    fn prop_out_of_range_days_rejected(days in prop_oneof![i64::MIN..1i64, 32i64..i64::MAX]) {
        let state = awaiting_days();
        let event = Event::Inbound(Inbound::Reply(days.to_string()));
        let result = transition(&state, &ctx(SelectionMode::Numeric), event);

        prop_assert!(!has_statement_fetch(&result));
        prop_assert_eq!(result.state, state);
    }

    // Days inside 1..=31 request exactly days * 86400 seconds ending now
    #[test]
    fn prop_in_range_days_request_window(days in MIN_DAYS..=MAX_DAYS) {
        let state = awaiting_days();
        let event = Event::Inbound(Inbound::Reply(days.to_string()));
        let result = transition(&state, &ctx(SelectionMode::Numeric), event);

        let windows: Vec<_> = result
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::FetchStatement { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        prop_assert_eq!(windows, vec![(NOW - i64::from(days) * SECONDS_PER_DAY, NOW)]);
    }

    // Cancel from any phase returns to idle with nothing selected
    #[test]
    fn prop_cancel_resets(state in arb_state(), mode in arb_mode()) {
        let result = transition(&state, &ctx(mode), Event::Inbound(Inbound::Command(Command::Cancel)));

        prop_assert_eq!(&result.state.phase, &Phase::Idle);
        prop_assert!(result.state.catalog.is_none());
        prop_assert!(result.state.selected_account().is_none());
        prop_assert_eq!(&result.state.credential, &state.credential);
        prop_assert!(!has_statement_fetch(&result));
    }

    // Selection k succeeds iff 1 <= k <= m
    #[test]
    fn prop_numeric_selection_bounds(
        accounts in proptest::collection::vec(arb_account(), 1..6),
        k in 0usize..10,
    ) {
        let mut state = ConversationState {
            credential: Some(Credential::new("token")),
            ..Default::default()
        };
        state.install_catalog(accounts.clone());
        state.phase = Phase::AwaitingAccountSelection;

        let event = Event::Inbound(Inbound::Reply(k.to_string()));
        let result = transition(&state, &ctx(SelectionMode::Numeric), event);

        if (1..=accounts.len()).contains(&k) {
            prop_assert_eq!(result.state.selected_account(), Some(&accounts[k - 1]));
        } else {
            prop_assert_eq!(result.state, state);
        }
    }

    // Buttons resolve the same way, and only for the current generation
    #[test]
    fn prop_button_selection_bounds(
        accounts in proptest::collection::vec(arb_account(), 1..6),
        k in 0usize..10,
        stale in any::<bool>(),
    ) {
        let mut state = ConversationState::default();
        let generation = state.install_catalog(accounts.clone());
        state.phase = Phase::AwaitingAccountSelection;

        let pressed = if stale { generation + 1 } else { generation };
        let event = Event::Inbound(Inbound::Button(Callback::Account { generation: pressed, index: k }));
        let result = transition(&state, &ctx(SelectionMode::Buttons), event);

        if !stale && (1..=accounts.len()).contains(&k) {
            prop_assert_eq!(result.state.selected_account(), Some(&accounts[k - 1]));
        } else {
            prop_assert_eq!(result.state, state);
        }
    }

    // Every transition answers with at least one message or one bank call
    #[test]
    fn prop_every_input_gets_a_reaction(state in arb_state(), mode in arb_mode(), text in "[ -~]{0,12}") {
        let result = transition(&state, &ctx(mode), Event::Inbound(Inbound::from_text(&text)));
        prop_assert!(!result.effects.is_empty());
    }

    // /account_info never fetches without a credential
    #[test]
    fn prop_account_info_requires_credential(state in arb_state(), mode in arb_mode()) {
        let result = transition(&state, &ctx(mode), Event::Inbound(Inbound::Command(Command::AccountInfo)));
        let fetches = result
            .effects
            .iter()
            .any(|effect| matches!(effect, Effect::FetchAccounts { .. }));
        prop_assert_eq!(fetches, state.credential.is_some());
    }
}
