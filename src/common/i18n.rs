// src/common/i18n.rs

use std::collections::HashMap;

const FALLBACK_LANG: &str = "en";

// (código, português, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("VALIDATION_ERROR", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("EMAIL_ALREADY_EXISTS", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("INVALID_CREDENTIALS", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("UNAUTHORIZED", "Não autorizado.", "Unauthorized."),
    ("TENANT_REQUIRED", "Não foi possível identificar a organização.", "Organization could not be resolved."),
    ("ROLE_NOT_ALLOWED", "Seu cargo não permite esta ação.", "Your role does not allow this action."),
    ("STAFF_GRANT_REQUIRED", "Você não faz parte da equipe desta organização.", "You are not a staff member of this organization."),
    ("STORE_ACCESS_DENIED", "Você não tem acesso a esta loja.", "You do not have access to this store."),
    ("STORE_REQUIRED", "Informe a loja.", "A store must be specified."),
    ("FEATURE_NOT_ENABLED", "Funcionalidade não habilitada para esta loja.", "Feature is not enabled for this store."),
    ("ROLE_NOT_PROVISIONABLE", "Você não pode criar membros com este cargo.", "You cannot create members with this role."),
    ("STORE_LIMIT_EXCEEDED", "Limite de lojas do plano atingido.", "Store limit for your plan reached."),
    ("STAFF_LIMIT_EXCEEDED", "Limite de funcionários do plano atingido.", "Staff limit for your plan reached."),
    ("FEATURE_DEPENDENCY_MISSING", "Habilite primeiro a funcionalidade pré-requisito.", "Enable the prerequisite feature first."),
    ("PLAN_UPGRADE_REQUIRED", "Seu plano não inclui esta funcionalidade.", "Your plan does not include this feature."),
    ("NOT_FOUND", "Recurso não encontrado.", "Resource not found."),
    ("PAYLOAD_TOO_LARGE", "O corpo da requisição é grande demais.", "Request body is too large."),
    ("INTERNAL_ERROR", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
    // Mensagens de validação de campo
    ("invalid_email", "O e-mail fornecido é inválido.", "The e-mail is invalid."),
    ("password_too_short", "A senha deve ter no mínimo 6 caracteres.", "Password must be at least 6 characters."),
    ("required", "Campo obrigatório.", "This field is required."),
    ("too_long", "Texto muito longo.", "Text is too long."),
];

/// Catálogo de mensagens por idioma. Carregado uma vez e compartilhado via AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (key, pt_msg, en_msg) in MESSAGES {
            pt.insert(*key, *pt_msg);
            en.insert(*key, *en_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);
        Self { messages }
    }
}

impl I18nStore {
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.messages.get(FALLBACK_LANG).and_then(|c| c.get(key)))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
