//! Translation file completeness
//!
//! Loads the real translation files and checks that every key the bot
//! emits at runtime resolves to actual text.

use leadflow::config::I18nConfig;
use leadflow::i18n::I18n;

async fn loaded_i18n() -> I18n {
    let config = I18nConfig {
        default_language: "ru".to_string(),
        supported_languages: vec!["ru".to_string(), "en".to_string()],
    };
    let mut i18n = I18n::new(&config);
    i18n.load_translations().await.expect("translation files must load");
    i18n
}

const RUNTIME_KEYS: &[&str] = &[
    "menu.main",
    "menu.services",
    "menu.about",
    "menu.how_it_works",
    "services.shops",
    "services.booking",
    "services.support",
    "service_names.shops",
    "service_names.booking",
    "service_names.support",
    "buttons.services",
    "buttons.about",
    "buttons.apply",
    "buttons.back",
    "buttons.back_to_services",
    "buttons.order_this",
    "buttons.main_menu",
    "buttons.apply_again",
    "buttons.contact_direct",
    "buttons.how_it_works",
    "buttons.send_contact",
    "buttons.open_crm",
    "buttons.language.russian",
    "buttons.language.english",
    "start.greeting",
    "start.choose_language",
    "start.language_saved",
    "intake.start_generic",
    "intake.start_with_context",
    "intake.ask_business_type",
    "intake.ask_budget",
    "intake.budget_confirmed",
    "intake.ask_task",
    "intake.ask_contact",
    "intake.retry_name",
    "intake.retry_business_type",
    "intake.retry_budget",
    "intake.retry_task",
    "intake.retry_contact",
    "intake.thanks",
    "intake.submitted_menu",
    "intake.already_received",
    "cancel.done",
    "admin.crm_prompt",
    "admin.stats",
    "admin.seed_done",
    "negotiate.accepted",
    "negotiate.rejected",
];

#[tokio::test]
async fn every_runtime_key_resolves_in_both_languages() {
    let i18n = loaded_i18n().await;

    for key in RUNTIME_KEYS {
        for lang in ["ru", "en"] {
            let text = i18n.t(key, lang, None);
            assert_ne!(&text, key, "missing translation for {} ({})", key, lang);
        }
    }
}

#[tokio::test]
async fn unknown_language_falls_back_to_default() {
    let i18n = loaded_i18n().await;
    let ru = i18n.t("menu.main", "ru", None);
    let de = i18n.t("menu.main", "de", None);
    assert_eq!(ru, de);
}
