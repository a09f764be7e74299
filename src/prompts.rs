//! Instruction texts sent to the completion model.
//!
//! The brokerage works in Spanish, so the instructions and the email template
//! are written in Spanish; the model answers in the same language.

/// Shared instructions for every flat (one record per document) sheet.
pub const FLAT_INSTRUCTIONS: &str = "Instrucciones importantes:
1. La dirección completa DEBE:
   - Estar en un solo campo
   - Incluir número exterior, interior, colonia, ciudad y código postal
   - Estar encerrada entre comillas dobles
   - NO usar símbolos como \\ o // dentro o fuera de las comillas
   - Ejemplo correcto: \"Prolongacion Cristobal Colon No. 391, Colima, Colima, 28078\"
2. Extrae SOLO los datos que coincidan con los nombres de columnas proporcionados.
3. NO agregues columnas extra ni datos que no se ajusten a la estructura especificada.
4. Si no encuentras una coincidencia para una columna, déjala en blanco en la salida.
5. Usa SOLO los siguientes nombres de compañías como 'Aseguradora': GNP, Qualitas, ANA, HDI, SURA, MAPFRE. Usa solo nombres cortos.
6. Asegúrate de que el campo 'Aseguradora' esté siempre presente y correctamente identificado.
7. Para el tipo de pago: si se menciona 'Contado', cámbialo a 'Anual'.
8. Para la columna 'Pagos Fraccionados' usa: Anual: 0, Mensual: 12, Trimestral: 4, Semestral: 2.
9. 'Forma de pago' debe ser solo una de estas: Anual, Mensual, Trimestral, Semestral.
10. Todas las fechas deben estar en el formato dd/mm/aaaa.
11. 'No. de Pagos' siempre debe estar en blanco.
12. Todos los nombres deben estar en Mayúsculas y Minúsculas.
13. Deja 'e-mail' y 'PDF' en blanco.
14. Calcula 'Monto Parcial' como (Prima Total - Derecho de Póliza) / Pagos Fraccionados, redondeado a 1 decimal. Solo para GMM calcúlalo como Prima Total / Pagos Fraccionados.
15. Los valores numéricos van sin comas ni símbolos $ y, al igual que las fechas, sin comillas.
16. No incluyas nombres de columnas ni los ejemplos.
17. Verifica que cada columna tenga su valor correspondiente en el orden correcto.
18. Usa una sola línea para el csv.
19. Para tipo de vehículo deduce si es auto, moto o camión por la descripción del vehículo.
20. El número de póliza debe ir sin ceros a la izquierda.";

/// Group medical-expenses policies: contract header plus insured list.
pub const GROUPED_GMM_INSTRUCTIONS: &str = "Instrucciones (solo csv, sin comentarios ni símbolos extra):

1. Extrae los datos de la carátula de la póliza en una sola línea, sin nombres de columnas:
   Número de Póliza, Contratante, R.F.C., Domicilio, Desde (Vigencia), Hasta (Vigencia), Forma de Pago,
   Fecha de Expedición, Planes, Suma Asegurada, Deducible, Coaseguro, Prima Neta, Derecho de Póliza,
   Recargo por Pago Fraccionado, Prima Total, I.V.A., Total a Pagar, Nombre del Agente, Clave Zona.
2. Extrae la lista de asegurados, una línea por asegurado, con estas columnas únicamente:
   Status (siempre Vigente), Número de Certificado, Nombre Completo, Sexo, Edad, Cobertura,
   Suma Asegurada, Prima, Fecha de Antigüedad.
3. Los valores largos van entre comillas dobles. Agrega las comas vacías necesarias para que el csv se lea bien.
4. Ejemplo:
   12345,\"EMPRESA SA DE CV\",ABC123456DEF,\"CALLE EJEMPLO 123, COLONIA MUESTRA, CIUDAD, CP 12345\",01/01/2023,31/12/2023,Anual,15/12/2022,\"Plan A\",1000000,5000,10,50000,500,1000,51500,8240,59740,\"JUAN PEREZ\",1234
   Vigente,001,\"RODRIGUEZ SANCHEZ MARIA\",F,35,\"Cobertura Amplia\",500000,2500,01/01/2020";

/// Fleet policies: contract header plus insured vehicles.
pub const GROUPED_AUTOS_INSTRUCTIONS: &str = "Instrucciones (solo csv, sin comentarios ni símbolos extra):

1. Extrae los datos de la carátula de la póliza en una sola línea, sin nombres de columnas:
   Número de Póliza, Contratante, R.F.C., Domicilio, Desde (Vigencia), Hasta (Vigencia), Forma de Pago,
   Aseguradora, Prima Neta, Derecho de Póliza, I.V.A., Prima Total, Nombre del Agente.
2. Extrae la lista de vehículos asegurados, una línea por vehículo, con estas columnas únicamente:
   Inciso, Descripción del Vehículo, Modelo, Serie, Placas, Tipo de Vehículo (auto, moto o camión), Cobertura, Prima.
3. Los valores largos van entre comillas dobles. Las fechas en formato dd/mm/aaaa y los números sin comas ni símbolos $.";

/// Group life policies: contract header plus insured list.
pub const GROUPED_VIDA_INSTRUCTIONS: &str = "Instrucciones (solo csv, sin comentarios ni símbolos extra):

1. Extrae los datos de la carátula de la póliza en una sola línea, sin nombres de columnas:
   Número de Póliza, Contratante, R.F.C., Domicilio, Desde (Vigencia), Hasta (Vigencia), Forma de Pago,
   Aseguradora, Suma Asegurada, Prima Neta, Prima Total, Nombre del Agente.
2. Extrae la lista de asegurados, una línea por asegurado, con estas columnas únicamente:
   Status (siempre Vigente), Número de Certificado, Nombre Completo, Sexo, Edad, Suma Asegurada, Prima, Beneficiarios.
3. Los valores largos van entre comillas dobles. Las fechas en formato dd/mm/aaaa y los números sin comas ni símbolos $.";

/// System message for the summary call
pub const SUMMARY_SYSTEM: &str = "You are a helpful assistant that extracts and formats data.";

/// Narrative template the model fills in from the policy rows
pub const SUMMARY_TEMPLATE: &str = "Usa los datos de la póliza para completar el siguiente correo: Estimado(a) (usa nombre del cliente),

Tenemos el gusto de enviar la póliza (número) con inicio de vigencia (fecha de inicio) de la póliza de (ramo: automóvil, moto o camión especificando modelo; vida; gastos médicos; hogar), con un costo anual de (usar pago total o prima total de la póliza, agrega signo de $), de la compañía de seguros (compañía de seguros).

Se adjunta carátula, condiciones generales y el aviso de cobro para su amable programación del pago; el plazo vence el (agregar manualmente) a las 12:00 del día, y puede ser liquidado mediante tarjeta de crédito, pagando con cheque o efectivo en ventanilla bancaria o transferencia como pago de servicios.

Agradecemos nos informe qué forma de pago utilizará para poder apoyarle.

Importante: Favor de enviarnos su constancia de identificación fiscal para actualizar sus datos y emitir su factura con sus datos vigentes; una vez emitida, ya no podrán hacerse cambios.

Para dar cumplimiento a las disposiciones legales le agradecemos nos dé acuse de recibido de este correo.

Firma: se pondrá manualmente con teléfonos y correo. NO hagas comentarios extra al correo. Solo la data que te pido.";

/// User content for a flat sheet: instructions, the schema, then the document text
pub fn flat_request(instructions: &str, columns: &[String], text: &str) -> String {
    format!(
        "{}\n\nColumnas a extraer: {}\n\nExtrae los datos del siguiente texto:\n\n{}",
        instructions,
        columns.join(", "),
        text
    )
}

/// User content for the contract header of a grouped sheet
pub fn policy_header_request(instructions: &str, policy_text: &str) -> String {
    format!("{}\n\nExtrae los datos de la póliza del siguiente texto:\n\n{}", instructions, policy_text)
}

/// User content for one chunk of the insured list of a grouped sheet
pub fn members_request(instructions: &str, chunk: &str) -> String {
    format!("{}\n\nExtrae los datos de los asegurados del siguiente texto:\n\n{}", instructions, chunk)
}

/// User content for the client email summary
pub fn summary_request(csv: &str) -> String {
    format!("{}\n\n{}", SUMMARY_TEMPLATE, csv)
}
