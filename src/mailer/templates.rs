use chrono::{DateTime, Utc};

use super::Email;
use crate::database::models::CertificateKind;
use crate::reports::certificate::verification_url;
use crate::reports::text::spanish_date;

pub fn welcome(name: &str, email: &str, temporary_password: &str, base_url: &str) -> Email {
    Email {
        to: email.to_string(),
        to_name: Some(name.to_string()),
        subject: "Su cuenta en el Registro de Juntas".to_string(),
        body: format!(
            "Hola {name},\n\n\
             Se ha creado una cuenta para usted en el Registro de Juntas.\n\n\
             Usuario: {email}\n\
             Contraseña temporal: {temporary_password}\n\n\
             Ingrese en {base_url} y cambie la contraseña en su primer acceso.\n"
        ),
    }
}

pub fn password_reset(name: &str, email: &str, temporary_password: &str, base_url: &str) -> Email {
    Email {
        to: email.to_string(),
        to_name: Some(name.to_string()),
        subject: "Restablecimiento de contraseña".to_string(),
        body: format!(
            "Hola {name},\n\n\
             Un administrador restableció su contraseña.\n\n\
             Contraseña temporal: {temporary_password}\n\n\
             Ingrese en {base_url} y cámbiela cuanto antes. Si no solicitó este cambio, \
             comuníquese con la Secretaría.\n"
        ),
    }
}

pub fn certificate_issued(
    to: &str,
    board_name: &str,
    kind: CertificateKind,
    code: &str,
    valid_until: DateTime<Utc>,
    base_url: &str,
) -> Email {
    Email {
        to: to.to_string(),
        to_name: Some(board_name.to_string()),
        subject: format!("Documento expedido: {}", kind.title_es()),
        body: format!(
            "Se expidió el documento \"{}\" para {}.\n\n\
             Código de verificación: {}\n\
             Vigente hasta: {}\n\n\
             Cualquier persona puede comprobar su autenticidad en:\n{}\n",
            kind.title_es(),
            board_name,
            code,
            spanish_date(valid_until.date_naive()),
            verification_url(base_url, code)
        ),
    }
}
