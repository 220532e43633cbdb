//! Column names of the legacy spreadsheet exports.
//!
//! The headers are the legacy system's own, in Portuguese; they are matched
//! after the whitespace normalization applied by [`RowSet`](crate::RowSet).

/// Patient export columns.
pub mod patient {
    pub const LEGACY_ID: &str = "ID paciente";
    pub const NAME: &str = "Nome";
    pub const BIRTH_DATE: &str = "Data nascimento";
    pub const SEX: &str = "Sexo";
    pub const NATIONAL_ID: &str = "CPF";
    pub const MOTHER_NAME: &str = "Nome da mae";
    pub const EMAIL: &str = "E-mail";
    pub const PHONE: &str = "Telefone";
    pub const STREET: &str = "Endereço";
    pub const DISTRICT: &str = "Bairro";
    pub const POSTAL_CODE: &str = "CEP";
    pub const CITY: &str = "Cidade";
    pub const STATE: &str = "UF";
    pub const COUNTRY: &str = "Pais";
    pub const INSURER_1: &str = "Operadora 1";
    pub const PLAN_1: &str = "Plano / Modalidade 1";
    pub const MEMBER_CODE_1: &str = "Matricula convênio 1";
    pub const ACTIVE_1: &str = "Vigente 1";
    pub const PRIVATE_1: &str = "Privativo 1";
    pub const INSURER_2: &str = "Operadora 2";
    pub const PLAN_2: &str = "Plano / Modalidade 2";
    pub const MEMBER_CODE_2: &str = "Matricula convênio 2";
    pub const ACTIVE_2: &str = "Vigente 2";
    pub const PRIVATE_2: &str = "Privativo 2";
    pub const DECEASED_OR_LOST: &str = "Obito / Perda de seguimento";
    pub const CASE_STATUS: &str = "Status do caso";
}

/// Encounter export columns.
pub mod encounter {
    pub const CODE: &str = "Atendimento";
    pub const PATIENT_NAME: &str = "Nome";
    pub const DATE: &str = "Data";
    pub const ENCOUNTER_TYPE: &str = "Tipo de atendimento";
    pub const PROCEDURE: &str = "Procedimento";
    pub const LOCATION: &str = "Local";
    pub const INSURER: &str = "Convênio";
    pub const INSURER_PLAN: &str = "Plano do convênio";
    pub const PRIVATE: &str = "Privativo";
    pub const PAYMENT_MADE: &str = "Pagamento efetivado?";
    pub const PROJECTED_BILLING: &str = "Faturamento Previsto";
    pub const MANUAL_FEE_RECORD: &str = "Registro manual do valor de HM";
    pub const FINAL_PROJECTED_BILLING: &str = "Faturamento previsto final";
    pub const PARTNER_BILLING_PRIMARY: &str = "Faturamento Letícia";
    pub const PARTNER_BILLING_SECONDARY: &str = "Faturamento AG+LU";
    pub const BILLING_SENT_DATE: &str = "Data envio para cobrança";
    pub const EXPECTED_PAYMENT_DATE: &str = "Data esperada para pagamento";
    pub const PAYMENT_DATE: &str = "Data do pagamento";
    pub const INVOICE_REF: &str = "Nota Fiscal Correspondente";
    pub const NOTES: &str = "Observações";
    pub const WEEK: &str = "Semana #";
    pub const MONTH: &str = "Mes";
    pub const YEAR: &str = "Ano";
    pub const QUARTER: &str = "Trimestre";
    pub const QUARTER_YEAR: &str = "Trimestre + Ano";
}
